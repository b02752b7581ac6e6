//! Parsers for `--var`-style command line arguments.

use anyhow::bail;

/// Parse a `--var key=value` argument into a pair of strings.
pub fn parse_kv(s: &str) -> anyhow::Result<(String, String)> {
    parse_eq_pair(s, "--var must be of the form `key=value`")
}

fn parse_eq_pair(s: &str, err_msg: &str) -> anyhow::Result<(String, String)> {
    if let Some((key, value)) = s.split_once('=') {
        Ok((key.to_owned(), value.to_owned()))
    } else {
        bail!("{err_msg}");
    }
}

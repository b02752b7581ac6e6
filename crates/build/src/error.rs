//! Builder errors

/// Builder errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The build command exited non-zero.
    #[error("build for component `{id}` failed with exit code {exit_code:?}:\n{stderr_tail}")]
    BuildExec {
        /// The component whose build failed
        id: String,
        /// Process exit code, if the process terminated normally
        exit_code: Option<i32>,
        /// The last lines of the build command's stderr
        stderr_tail: String,
    },

    /// The build command succeeded but no `.wasm` was found at any searched path.
    #[error("no .wasm produced for component `{id}`; searched: {}", .searched_paths.join(", "))]
    WasmNotFound {
        /// The component that was built
        id: String,
        /// Paths searched, in search order
        searched_paths: Vec<String>,
    },

    /// Failure spawning or waiting on the build command's subprocess.
    #[error(transparent)]
    Spawn(#[from] subprocess::PopenError),
}

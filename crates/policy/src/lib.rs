//! Rego authorization policy generation.
//!
//! Given an access mode and the context it needs, this crate emits stable
//! Rego policy text plus JSON policy data for the authorizer component to
//! evaluate at runtime. The generator never evaluates Rego itself — it only
//! produces text, matching the exact predicates the authorizer expects.

#![deny(missing_docs)]

mod error;

pub use error::Error;
pub use ftl_descriptor::AccessMode;

/// The Rego package every generated policy is emitted under.
pub const PACKAGE: &str = "mcp.authorization";

/// Whether the caller's identity is a human user or a machine-to-machine actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorType {
    /// A human, authenticated interactively.
    User,
    /// A service account, authenticated via client credentials.
    Machine,
}

/// Inputs the generator needs to build a policy for a given access mode.
/// Irrelevant fields for a given mode are simply unused.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// `private`: the single subject allowed to call the deployed application.
    pub owner_subject: Option<String>,
    /// `org`: the WorkOS organization ID members must belong to.
    pub org_id: Option<String>,
    /// `org`: subjects belonging to `org_id`, used by the user clause.
    pub org_members: Vec<String>,
    /// `org`: the deploying actor's type, carried through for downstream context.
    pub actor_type: Option<ActorType>,
}

/// A generated Rego policy: its source text and the data it evaluates against.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    /// Rego policy source text.
    pub source: String,
    /// Policy data, serialized alongside `source` in the runtime manifest.
    pub data: serde_json::Value,
}

/// The result of asking the generator for a policy.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A policy was generated.
    Generated(Policy),
    /// The caller supplies its own policy; the generator produces nothing.
    PassThrough,
    /// The access mode requires no policy at all.
    None,
}

/// Generate a policy for the given access mode and context.
pub fn generate(mode: AccessMode, ctx: &Context) -> Result<Outcome, Error> {
    match mode {
        AccessMode::Public => Ok(Outcome::None),
        AccessMode::Custom => Ok(Outcome::PassThrough),
        AccessMode::Private => {
            let owner = ctx.owner_subject.as_deref().ok_or_else(|| {
                Error::InvalidPolicyContext {
                    mode: "private",
                    reason: "no allowed subjects supplied".to_owned(),
                }
            })?;
            if owner.is_empty() {
                return Err(Error::InvalidPolicyContext {
                    mode: "private",
                    reason: "owner subject must not be empty".to_owned(),
                });
            }
            let source = format!(
                "package {PACKAGE}\n\
                 default allow = false\n\
                 allow {{ input.token.sub == data.owner }}\n"
            );
            let data = serde_json::json!({ "owner": owner });
            Ok(Outcome::Generated(Policy { source, data }))
        }
        AccessMode::Org => {
            let org_id = ctx.org_id.as_deref().ok_or_else(|| Error::InvalidPolicyContext {
                mode: "org",
                reason: "no org_id supplied".to_owned(),
            })?;
            if org_id.is_empty() {
                return Err(Error::InvalidPolicyContext {
                    mode: "org",
                    reason: "org_id must not be empty".to_owned(),
                });
            }
            let source = format!(
                "package {PACKAGE}\n\
                 default allow = false\n\
                 allow {{ not input.token.claims.org_id; input.token.sub == data.members[_] }}\n\
                 allow {{ input.token.claims.org_id; input.token.claims.org_id == data.org_id }}\n"
            );
            let data = serde_json::json!({
                "org_id": org_id,
                "members": ctx.org_members,
            });
            Ok(Outcome::Generated(Policy { source, data }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_has_no_policy() {
        assert_eq!(
            generate(AccessMode::Public, &Context::default()).unwrap(),
            Outcome::None
        );
    }

    #[test]
    fn custom_is_pass_through() {
        assert_eq!(
            generate(AccessMode::Custom, &Context::default()).unwrap(),
            Outcome::PassThrough
        );
    }

    #[test]
    fn private_owner_only_policy() {
        let ctx = Context {
            owner_subject: Some("u1".to_owned()),
            ..Default::default()
        };
        let Outcome::Generated(policy) = generate(AccessMode::Private, &ctx).unwrap() else {
            panic!("expected Generated outcome");
        };
        assert!(policy.source.contains("input.token.sub == data.owner"));
        assert_eq!(policy.data, serde_json::json!({ "owner": "u1" }));
    }

    #[test]
    fn private_without_owner_fails() {
        let err = generate(AccessMode::Private, &Context::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidPolicyContext { mode: "private", .. }));
    }

    #[test]
    fn org_dual_path_policy() {
        let ctx = Context {
            org_id: Some("org_X".to_owned()),
            org_members: vec!["u1".to_owned(), "u2".to_owned()],
            actor_type: Some(ActorType::User),
            ..Default::default()
        };
        let Outcome::Generated(policy) = generate(AccessMode::Org, &ctx).unwrap() else {
            panic!("expected Generated outcome");
        };
        assert!(policy
            .source
            .contains("not input.token.claims.org_id; input.token.sub == data.members[_]"));
        assert!(policy
            .source
            .contains("input.token.claims.org_id == data.org_id"));
        assert_eq!(
            policy.data,
            serde_json::json!({ "org_id": "org_X", "members": ["u1", "u2"] })
        );
    }

    #[test]
    fn org_without_org_id_fails() {
        let err = generate(AccessMode::Org, &Context::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidPolicyContext { mode: "org", .. }));
    }
}

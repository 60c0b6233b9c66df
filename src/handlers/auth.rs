use std::collections::HashMap;
use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::order::Actor;
use crate::errors::AppError;

/// Maps a bearer token to an acting user. The actual token scheme is owned
/// by the surrounding deployment; the handlers only see the resolved actor.
pub trait ActorResolver: Send + Sync + 'static {
    fn resolve(&self, token: &str) -> Option<Actor>;
}

/// Extractor: `Authorization: Bearer <token>` resolved through the
/// registered [`ActorResolver`]. Missing or unknown tokens yield 401.
#[derive(Debug, Clone, Copy)]
pub struct AuthedActor(pub Actor);

impl FromRequest for AuthedActor {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let actor = req
            .app_data::<web::Data<dyn ActorResolver>>()
            .and_then(|resolver| bearer_token(req).and_then(|t| resolver.resolve(t)));
        ready(actor.map(AuthedActor).ok_or(AppError::Unauthorized))
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Fixed token table, populated at startup from configuration. Suitable for
/// deployments where an upstream gateway already authenticates users and
/// issues service tokens.
#[derive(Debug, Default)]
pub struct StaticTokenResolver {
    tokens: HashMap<String, Actor>,
}

impl StaticTokenResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, actor: Actor) {
        self.tokens.insert(token.into(), actor);
    }

    /// Parses a comma-separated spec of `token=user_uuid` or
    /// `token=user_uuid:manager` entries; malformed entries are skipped with
    /// a warning.
    pub fn from_spec(spec: &str) -> Self {
        let mut resolver = Self::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((token, rest)) = entry.split_once('=') else {
                log::warn!("ignoring malformed token entry '{}'", entry);
                continue;
            };
            let (user_part, is_manager) = match rest.split_once(':') {
                Some((user, "manager")) => (user, true),
                Some(_) => {
                    log::warn!("ignoring token entry with unknown role '{}'", entry);
                    continue;
                }
                None => (rest, false),
            };
            match Uuid::parse_str(user_part) {
                Ok(user_id) => resolver.insert(
                    token,
                    Actor {
                        user_id,
                        is_manager,
                    },
                ),
                Err(_) => log::warn!("ignoring token entry with invalid user id '{}'", entry),
            }
        }
        resolver
    }
}

impl ActorResolver for StaticTokenResolver {
    fn resolve(&self, token: &str) -> Option<Actor> {
        self.tokens.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_inserted_tokens() {
        let mut resolver = StaticTokenResolver::new();
        let user_id = Uuid::new_v4();
        resolver.insert(
            "secret",
            Actor {
                user_id,
                is_manager: false,
            },
        );

        let actor = resolver.resolve("secret").expect("should resolve");
        assert_eq!(actor.user_id, user_id);
        assert!(!actor.is_manager);
        assert!(resolver.resolve("other").is_none());
    }

    #[test]
    fn parses_spec_with_roles() {
        let user = Uuid::new_v4();
        let manager = Uuid::new_v4();
        let spec = format!("u-token={}, m-token={}:manager", user, manager);
        let resolver = StaticTokenResolver::from_spec(&spec);

        let u = resolver.resolve("u-token").expect("user token");
        assert_eq!(u.user_id, user);
        assert!(!u.is_manager);

        let m = resolver.resolve("m-token").expect("manager token");
        assert!(m.is_manager);
    }

    #[test]
    fn skips_malformed_entries() {
        let user = Uuid::new_v4();
        let spec = format!("bare-token, bad=not-a-uuid, odd={}:admin, ok={}", user, user);
        let resolver = StaticTokenResolver::from_spec(&spec);

        assert!(resolver.resolve("bare-token").is_none());
        assert!(resolver.resolve("bad").is_none());
        assert!(resolver.resolve("odd").is_none());
        assert!(resolver.resolve("ok").is_some());
    }
}

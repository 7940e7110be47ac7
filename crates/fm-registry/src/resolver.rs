use fm_schemas::{EntityKey, Identifiers, Jurisdiction};
use serde::Serialize;
use std::sync::Arc;

use crate::EntityRegistry;

/// Caller-supplied identifiers that take precedence over the registry.
pub type Overrides = Identifiers;

/// An entity ready to be onboarded: jurisdiction known, identifiers attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedEntity {
    pub ticker: EntityKey,
    pub jurisdiction: Jurisdiction,
    pub identifiers: Identifiers,
    /// `true` when the registry knew this ticker (possibly reclassified by an override).
    pub from_registry: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// Neither the registry nor the overrides identify the entity.
    UnknownEntity { ticker: EntityKey },
    /// Both a CIK and a scrip code were supplied; the jurisdiction is ambiguous.
    ConflictingIdentifiers {
        ticker: EntityKey,
        cik: String,
        scrip_code: String,
    },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEntity { ticker } => write!(
                f,
                "Unknown ticker: {ticker}. Provide CIK (US) or scrip_code (India)."
            ),
            Self::ConflictingIdentifiers {
                ticker,
                cik,
                scrip_code,
            } => write!(
                f,
                "Conflicting identifiers supplied for {ticker}: CIK {cik} (US) and scrip_code {scrip_code} (India). Provide only one."
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Resolves tickers against a shared [`EntityRegistry`].
#[derive(Clone, Debug)]
pub struct EntityResolver {
    registry: Arc<EntityRegistry>,
}

impl EntityResolver {
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    /// Resolve `ticker` with optional identifier overrides.
    ///
    /// - A supplied CIK reclassifies the entity as US; a supplied scrip code
    ///   as India. Identifiers of the other jurisdiction are kept.
    /// - Unknown tickers are synthesized from the supplied identifier.
    /// - Supplying both override identifiers is an error.
    pub fn resolve(
        &self,
        ticker: &EntityKey,
        overrides: &Overrides,
    ) -> Result<ResolvedEntity, ResolveError> {
        let overrides = overrides.clone().normalized();

        if let (Some(cik), Some(scrip_code)) = (&overrides.cik, &overrides.scrip_code) {
            return Err(ResolveError::ConflictingIdentifiers {
                ticker: ticker.clone(),
                cik: cik.clone(),
                scrip_code: scrip_code.clone(),
            });
        }

        match self.registry.get(ticker) {
            Some(known) => {
                let mut resolved = ResolvedEntity {
                    ticker: known.ticker,
                    jurisdiction: known.jurisdiction,
                    identifiers: known.identifiers,
                    from_registry: true,
                };
                if let Some(cik) = overrides.cik {
                    resolved.jurisdiction = Jurisdiction::Us;
                    resolved.identifiers.cik = Some(cik);
                }
                if let Some(code) = overrides.scrip_code {
                    resolved.jurisdiction = Jurisdiction::India;
                    resolved.identifiers.scrip_code = Some(code);
                }
                Ok(resolved)
            }
            None => {
                let jurisdiction = if overrides.cik.is_some() {
                    Jurisdiction::Us
                } else if overrides.scrip_code.is_some() {
                    Jurisdiction::India
                } else {
                    return Err(ResolveError::UnknownEntity {
                        ticker: ticker.clone(),
                    });
                };
                Ok(ResolvedEntity {
                    ticker: ticker.clone(),
                    jurisdiction,
                    identifiers: overrides,
                    from_registry: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> EntityKey {
        EntityKey::new(s).unwrap()
    }

    fn resolver() -> EntityResolver {
        EntityResolver::new(Arc::new(EntityRegistry::with_defaults()))
    }

    #[test]
    fn registry_hit_without_overrides() {
        let r = resolver().resolve(&key("msft"), &Overrides::default()).unwrap();
        assert_eq!(r.jurisdiction, Jurisdiction::Us);
        assert_eq!(r.identifiers.cik.as_deref(), Some("0000789019"));
        assert!(r.from_registry);
    }

    #[test]
    fn scrip_override_reclassifies_registered_us_entity() {
        let r = resolver()
            .resolve(&key("AAPL"), &Identifiers::scrip_code("999999"))
            .unwrap();
        assert_eq!(r.jurisdiction, Jurisdiction::India);
        assert_eq!(r.identifiers.scrip_code.as_deref(), Some("999999"));
        assert_eq!(
            r.identifiers.cik.as_deref(),
            Some("0000320193"),
            "registry CIK is retained"
        );
    }

    #[test]
    fn cik_override_reclassifies_registered_india_entity() {
        let r = resolver()
            .resolve(&key("INFY"), &Identifiers::cik("0001067491"))
            .unwrap();
        assert_eq!(r.jurisdiction, Jurisdiction::Us);
        assert_eq!(r.identifiers.cik.as_deref(), Some("0001067491"));
        assert_eq!(r.identifiers.scrip_code.as_deref(), Some("500209"));
    }

    #[test]
    fn unknown_ticker_synthesized_from_identifier() {
        let r = resolver()
            .resolve(&key("ORCL"), &Identifiers::cik("0001341439"))
            .unwrap();
        assert_eq!(r.jurisdiction, Jurisdiction::Us);
        assert!(!r.from_registry);

        let r = resolver()
            .resolve(&key("WIPRO"), &Identifiers::scrip_code("507685"))
            .unwrap();
        assert_eq!(r.jurisdiction, Jurisdiction::India);
    }

    #[test]
    fn unknown_ticker_without_identifier_fails_with_guidance() {
        let err = resolver()
            .resolve(&key("ZZZZ"), &Overrides::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown ticker: ZZZZ. Provide CIK (US) or scrip_code (India)."
        );
    }

    #[test]
    fn blank_override_is_ignored() {
        let err = resolver()
            .resolve(&key("ZZZZ"), &Identifiers::cik("   "))
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownEntity { .. }));
    }

    #[test]
    fn both_overrides_is_an_error() {
        let overrides = Identifiers {
            cik: Some("1".to_string()),
            scrip_code: Some("2".to_string()),
        };
        let err = resolver().resolve(&key("AAPL"), &overrides).unwrap_err();
        assert!(matches!(err, ResolveError::ConflictingIdentifiers { .. }));
    }
}

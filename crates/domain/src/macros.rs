//! Macro for implementing Display and FromStr for status enums
//!
//! Backend payloads and log fields both carry small closed enums (eligibility
//! states, response subcodes). This macro gives each of them one canonical
//! string form and case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use purchases_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum SyncState {
//!     Pending,
//!     Synced,
//! }
//!
//! impl_domain_status_conversions!(SyncState {
//!     Pending => "pending",
//!     Synced => "synced",
//! });
//! ```

/// Implements Display and FromStr traits for status enums
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
///
/// Parsing lowercases its input, so the mapped strings must be lowercase.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::types::IntroEligibilityStatus;
    use crate::UnexpectedResponseSubcode;

    #[test]
    fn display_uses_mapped_strings() {
        assert_eq!(IntroEligibilityStatus::Eligible.to_string(), "eligible");
        assert_eq!(IntroEligibilityStatus::Ineligible.to_string(), "ineligible");
        assert_eq!(IntroEligibilityStatus::Unknown.to_string(), "unknown");
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!(
            IntroEligibilityStatus::from_str("ELIGIBLE").unwrap(),
            IntroEligibilityStatus::Eligible
        );
        assert_eq!(
            UnexpectedResponseSubcode::from_str("Login_Missing_Response").unwrap(),
            UnexpectedResponseSubcode::LoginMissingResponse
        );
    }

    #[test]
    fn parsing_rejects_unknown_strings() {
        let result = IntroEligibilityStatus::from_str("maybe");
        assert!(result.unwrap_err().contains("Invalid IntroEligibilityStatus: maybe"));
        assert!(IntroEligibilityStatus::from_str("").is_err());
    }

    #[test]
    fn every_subcode_round_trips_through_its_string() {
        let subcodes = [
            UnexpectedResponseSubcode::CustomerInfoResponseMalformed,
            UnexpectedResponseSubcode::CustomerInfoResponseParsing,
            UnexpectedResponseSubcode::LoginMissingResponse,
            UnexpectedResponseSubcode::LoginResponseDecoding,
            UnexpectedResponseSubcode::GetOfferUnexpectedResponse,
            UnexpectedResponseSubcode::PostOfferEmptyResponse,
            UnexpectedResponseSubcode::PostOfferIdBadResponse,
            UnexpectedResponseSubcode::PostOfferIdMissingOffersInResponse,
            UnexpectedResponseSubcode::PostOfferIdSignature,
        ];

        for subcode in subcodes {
            let parsed = UnexpectedResponseSubcode::from_str(&subcode.to_string()).unwrap();
            assert_eq!(parsed, subcode);
        }
    }
}

//! Command handler modules and registration.

pub mod auction;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::CommandError;
use crate::registry::CommandRegistry;

/// Register every auction command with the registry.
pub fn register_all(registry: &mut CommandRegistry) {
    registry.register("start-auction", auction::StartAuctionHandler);
    registry.register("join-as-bidder", auction::JoinAsBidderHandler);
    registry.register("submit-bid", auction::SubmitBidHandler);
    registry.register("end-auction", auction::EndAuctionHandler);
    registry.register("new-auction", auction::NewAuctionHandler);
}

/// Decode a command payload into its typed params.
pub(crate) fn parse_payload<T: DeserializeOwned>(
    command: &str,
    payload: Value,
) -> Result<T, CommandError> {
    serde_json::from_value(payload).map_err(|source| CommandError::InvalidPayload {
        command: command.to_owned(),
        source,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_all_covers_the_command_vocabulary() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        assert_eq!(
            registry.commands(),
            vec![
                "end-auction",
                "join-as-bidder",
                "new-auction",
                "start-auction",
                "submit-bid",
            ]
        );
    }

    #[test]
    fn parse_payload_decodes_typed_params() {
        let params: crate::types::SubmitBidParams =
            parse_payload("submit-bid", json!({"price": 15.0})).unwrap();
        assert_eq!(params.price, 15.0);
    }

    #[test]
    fn parse_payload_names_the_command_on_error() {
        let err = parse_payload::<crate::types::SubmitBidParams>(
            "submit-bid",
            json!({"price": "high"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("submit-bid"));
        assert_eq!(err.kind(), "invalid_payload");
    }
}

//! Discord channel message routes.

use binding::{ConfigurationError, RouteTable};
use serde_json::json;

/// Builds the channel message route table.
pub fn route_table() -> Result<RouteTable, ConfigurationError> {
    RouteTable::from_json(&json!({
        "/channels/{channel.id}/messages": {
            "GET": "getChannelMessages",
            "POST": "createMessage"
        },
        "/channels/{channel.id}/messages/{message.id}": {
            "GET": "getChannelMessage",
            "PATCH": "editMessage",
            "DELETE": "deleteMessage"
        },
        "/channels/{channel.id}/messages/{message.id}/crosspost": {
            "POST": "crosspostMessage"
        },
        "/channels/{channel.id}/messages/bulk-delete": {
            "POST": "bulkDeleteMessages"
        },
        "/channels/{channel.id}/pins": {
            "GET": "getPinnedMessages"
        },
        "/channels/{channel.id}/pins/{message.id}": {
            "PUT": "pinMessage",
            "DELETE": "unpinMessage"
        }
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use binding::HttpVerb;

    use super::*;

    #[test]
    fn installs_ten_message_methods() {
        let table = route_table().unwrap();
        assert_eq!(table.len(), 10);

        let edit = table.get("editMessage").unwrap();
        assert_eq!(edit.verb(), HttpVerb::Patch);
        assert_eq!(
            edit.template().as_str(),
            "/channels/{channel.id}/messages/{message.id}"
        );
        assert_eq!(
            edit.template().placeholders().collect::<Vec<_>>(),
            vec!["channel.id", "message.id"]
        );

        let unpin = table.get("unpinMessage").unwrap();
        assert_eq!(unpin.verb(), HttpVerb::Delete);
        assert_eq!(
            table
                .find("/channels/{channel.id}/pins/{message.id}", HttpVerb::Put)
                .unwrap()
                .method()
                .as_str(),
            "pinMessage"
        );
    }
}

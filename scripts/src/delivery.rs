use serde_json::json;

/// Serializes a delivery with one text message event, as LINE would send it
pub fn text_delivery(text: &str, reply_token: &str) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec(&json!({
        "destination": "Uscripts",
        "events": [{
            "type": "message",
            "mode": "active",
            "message": {"type": "text", "id": "1", "text": text},
            "replyToken": reply_token,
            "source": {"type": "user", "userId": "Uscripts"},
            "deliveryContext": {"isRedelivery": false}
        }]
    }))?)
}

//! The relay itself: validate, reshape, forward once.

use crate::error::RelayError;
use crate::types::{InboundRequest, MessagesPayload};
use crate::upstream::{MessagesTransport, UpstreamReply};
use secrecy::ExposeSecret;
use tracing::{debug, info};

/// Handle one raw `POST /api/claude` body.
///
/// Validation failures return before the transport is touched. A completed
/// upstream call is returned verbatim regardless of its status.
pub async fn handle(
    transport: &dyn MessagesTransport,
    body: &[u8],
) -> Result<UpstreamReply, RelayError> {
    let inbound = InboundRequest::parse(body)?;
    let payload = MessagesPayload::for_grocery_list(&inbound.image_data)?;
    debug!(model = %payload.model, max_tokens = payload.max_tokens, "built upstream payload");

    let reply = transport
        .send(inbound.api_key.expose_secret(), &payload)
        .await?;
    info!(status = reply.status, "relayed grocery list request");

    Ok(reply)
}

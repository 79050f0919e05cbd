//! Builds the fixed Messages request sent for every grocery list photo.

use crate::error::RelayError;
use crate::types::{
    ContentBlock, ImageData, ImageSource, ImageSourceType, Message, MessagesPayload, Role,
};

/// Model every request is pinned to.
pub const MODEL: &str = "claude-sonnet-4-5-20250929";

pub const MAX_TOKENS: u32 = 1024;

/// Instruction appended after the image. Must stay byte-for-byte stable; the
/// page parses the model's reply as a JSON array.
pub const GROCERY_LIST_INSTRUCTION: &str = "This is a handwritten grocery list. Please extract all the grocery items from this image and return them as a JSON array of strings. Each item should be a separate string in the array. Only include the item names, remove any bullets, quantities (like \"2x\"), or store names. Return ONLY the JSON array, nothing else. Example format: [\"milk\", \"eggs\", \"bread\"]";

impl MessagesPayload {
    /// One user message: the photo, then [`GROCERY_LIST_INSTRUCTION`].
    pub fn for_grocery_list(image: &ImageData) -> Result<Self, RelayError> {
        let source = ImageSource {
            kind: ImageSourceType::Base64,
            media_type: image.media_type()?.clone(),
            data: image.base64()?.clone(),
        };

        Ok(Self {
            model: MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: Role::User,
                content: vec![
                    ContentBlock::Image { source },
                    ContentBlock::Text {
                        text: GROCERY_LIST_INSTRUCTION.to_string(),
                    },
                ],
            }],
        })
    }
}

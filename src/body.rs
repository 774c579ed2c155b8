use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use tracing::debug;

/// Gmail encodes part bodies as URL-safe base64 and is inconsistent about padding.
const WEB_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// One node of a message's MIME tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    Leaf {
        mime_type: String,
        /// Encoded payload, absent for parts whose body lives elsewhere (attachments).
        data: Option<String>,
    },
    Composite {
        mime_type: String,
        children: Vec<ContentNode>,
    },
}

impl ContentNode {
    pub fn leaf(mime_type: impl Into<String>, data: Option<String>) -> Self {
        ContentNode::Leaf {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn composite(mime_type: impl Into<String>, children: Vec<ContentNode>) -> Self {
        ContentNode::Composite {
            mime_type: mime_type.into(),
            children,
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            ContentNode::Leaf { mime_type, .. } | ContentNode::Composite { mime_type, .. } => {
                mime_type
            }
        }
    }
}

fn is_text(mime_type: &str) -> bool {
    matches!(mime_type, "text/plain" | "text/html")
}

/// First readable text body in the tree, depth first. Empty when nothing decodes.
pub fn extract_body(node: &ContentNode) -> String {
    match node {
        ContentNode::Composite { children, .. } => {
            for child in children {
                match child {
                    // A decoded text part ends the scan, even when it is empty.
                    ContentNode::Leaf { mime_type, data } if is_text(mime_type) => {
                        if let Some(body) = decode_payload(data.as_deref()) {
                            return body;
                        }
                    }
                    ContentNode::Composite { .. } => {
                        let body = extract_body(child);
                        if !body.is_empty() {
                            return body;
                        }
                    }
                    ContentNode::Leaf { .. } => {}
                }
            }
            String::new()
        }
        ContentNode::Leaf { mime_type, data } if is_text(mime_type) => {
            decode_payload(data.as_deref()).unwrap_or_default()
        }
        ContentNode::Leaf { .. } => String::new(),
    }
}

/// `None` on a missing payload or one that is not valid base64 UTF-8.
fn decode_payload(data: Option<&str>) -> Option<String> {
    let data = data?;
    let bytes = match WEB_SAFE.decode(data.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Skipping part with undecodable payload");
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(error = %e, "Skipping part with non UTF-8 payload");
            None
        }
    }
}

#[cfg(test)]
pub(crate) fn encode(text: &str) -> String {
    base64::engine::general_purpose::URL_SAFE.encode(text)
}

//! Input validation for queries and backend settings

use crate::error::{ClientError, Result};

/// Longest query text accepted, in characters
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Validates a chat message before it is sent
pub fn validate_message(msg: &str) -> Result<()> {
    if msg.trim().is_empty() {
        return Err(ClientError::Validation("Message cannot be empty".to_string()));
    }

    if msg.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ClientError::Validation(format!(
            "Message too long (max {} characters)",
            MAX_MESSAGE_CHARS
        )));
    }

    Ok(())
}

/// Sanitizes a message by removing control characters the backend rejects
pub fn sanitize_message(msg: &str) -> String {
    let cleaned: String = msg.chars().filter(|&c| c != '\r' && c != '\0').collect();
    cleaned.trim().chars().take(MAX_MESSAGE_CHARS).collect()
}

/// Validates a backend base URL and returns it without a trailing slash
pub fn validate_backend_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ClientError::Validation("Backend URL cannot be empty".to_string()));
    }

    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| {
            ClientError::Validation("Backend URL must start with http:// or https://".to_string())
        })?;

    let authority = rest.split('/').next().unwrap_or("");
    if authority.contains(char::is_whitespace) {
        return Err(ClientError::Validation(
            "Backend URL contains whitespace".to_string(),
        ));
    }

    let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
        // IPv6 literal: [addr] or [addr]:port
        let (addr, after) = bracketed.split_once(']').ok_or_else(|| {
            ClientError::Validation("Unterminated IPv6 address in backend URL".to_string())
        })?;
        let port = match after {
            "" => None,
            rest => Some(rest.strip_prefix(':').ok_or_else(|| {
                ClientError::Validation(format!("Unexpected '{}' after IPv6 address", rest))
            })?),
        };
        (addr, port)
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return Err(ClientError::Validation("Hostname cannot be empty".to_string()));
    }

    if let Some(port) = port {
        let port_num = port
            .parse::<u16>()
            .map_err(|_| ClientError::Validation(format!("Invalid port number: {}", port)))?;
        if port_num == 0 {
            return Err(ClientError::Validation(
                "Port number must be greater than 0".to_string(),
            ));
        }
    }

    Ok(url.trim_end_matches('/').to_string())
}

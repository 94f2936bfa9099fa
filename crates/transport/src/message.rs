//! MessagePayload -> lettre `Message`
//!
//! MIME construction itself is lettre's; this only maps payload fields onto
//! the builder and reports anything unusable as an item-local `Message` error.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use contracts::{Addresses, AttachmentPayload, ContentEncoding, MailError, MessagePayload};
use lettre::message::header::{ContentType, HeaderName, HeaderValue};
use lettre::message::{Attachment, Mailbox, Mailboxes, MessageBuilder, MultiPart, SinglePart};
use lettre::Message;

/// Build a sendable message from a payload
///
/// # Errors
/// `Message` for unparsable addresses, header names, attachment content or
/// when lettre refuses the result (e.g. no sender or no recipient).
pub fn build_message(payload: &MessagePayload) -> Result<Message, MailError> {
    let mut builder = Message::builder();

    if let Some(from) = &payload.from {
        let sender = parse_addresses("from", from)?
            .into_iter()
            .next()
            .ok_or_else(|| MailError::message("from: no address given"))?;
        builder = builder.from(sender);
    }
    for mailbox in optional_addresses("to", payload.to.as_ref())? {
        builder = builder.to(mailbox);
    }
    for mailbox in optional_addresses("cc", payload.cc.as_ref())? {
        builder = builder.cc(mailbox);
    }
    for mailbox in optional_addresses("bcc", payload.bcc.as_ref())? {
        builder = builder.bcc(mailbox);
    }
    for mailbox in optional_addresses("replyTo", payload.reply_to.as_ref())? {
        builder = builder.reply_to(mailbox);
    }

    if let Some(subject) = &payload.subject {
        builder = builder.subject(subject.clone());
    }
    builder = builder.message_id(payload.message_id.clone());
    builder = with_extra_headers(builder, payload)?;

    let built = if payload.attachments.is_empty() {
        match body_part(payload) {
            Body::Single(part) => builder.singlepart(part),
            Body::Alternative(part) => builder.multipart(part),
        }
    } else {
        let mut mixed = match body_part(payload) {
            Body::Single(part) => MultiPart::mixed().singlepart(part),
            Body::Alternative(part) => MultiPart::mixed().multipart(part),
        };
        for attachment in &payload.attachments {
            mixed = mixed.singlepart(attachment_part(attachment)?);
        }
        builder.multipart(mixed)
    };

    built.map_err(|e| MailError::message(e.to_string()).with_source(e))
}

enum Body {
    Single(SinglePart),
    Alternative(MultiPart),
}

fn body_part(payload: &MessagePayload) -> Body {
    match (&payload.text, &payload.html) {
        (Some(text), Some(html)) => {
            Body::Alternative(MultiPart::alternative_plain_html(text.clone(), html.clone()))
        }
        (None, Some(html)) => Body::Single(SinglePart::html(html.clone())),
        (Some(text), None) => Body::Single(SinglePart::plain(text.clone())),
        (None, None) => Body::Single(SinglePart::plain(String::new())),
    }
}

fn optional_addresses(
    field: &str,
    addresses: Option<&Addresses>,
) -> Result<Vec<Mailbox>, MailError> {
    match addresses {
        Some(addresses) => parse_addresses(field, addresses),
        None => Ok(Vec::new()),
    }
}

/// Parse every entry; each entry may itself be a comma separated list
fn parse_addresses(field: &str, addresses: &Addresses) -> Result<Vec<Mailbox>, MailError> {
    let mut out = Vec::new();
    for entry in addresses.entries() {
        if entry.trim().is_empty() {
            continue;
        }
        let parsed: Mailboxes = entry.parse().map_err(|e| {
            MailError::message(format!("{field}: invalid address '{entry}'")).with_source(e)
        })?;
        out.extend(parsed);
    }
    Ok(out)
}

fn with_extra_headers(
    mut builder: MessageBuilder,
    payload: &MessagePayload,
) -> Result<MessageBuilder, MailError> {
    for (name, value) in &payload.headers {
        let header_name = HeaderName::new_from_ascii(name.clone())
            .map_err(|_| MailError::message(format!("headers: invalid header name '{name}'")))?;
        builder = builder.raw_header(HeaderValue::new(header_name, value.clone()));
    }
    Ok(builder)
}

fn attachment_part(attachment: &AttachmentPayload) -> Result<SinglePart, MailError> {
    let content = match attachment.encoding {
        ContentEncoding::Utf8 => attachment.content.clone().into_bytes(),
        ContentEncoding::Base64 => BASE64.decode(attachment.content.trim()).map_err(|e| {
            MailError::message(format!(
                "attachments: '{}' is not valid base64",
                attachment.filename
            ))
            .with_source(e)
        })?,
    };

    let content_type = attachment
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    let content_type = ContentType::parse(content_type).map_err(|e| {
        MailError::message(format!(
            "attachments: invalid content type '{content_type}' for '{}'",
            attachment.filename
        ))
        .with_source(e)
    })?;

    Ok(Attachment::new(attachment.filename.clone()).body(content, content_type))
}

/// Message-ID header of a built message, as sent
pub fn message_id(message: &Message) -> Option<String> {
    message
        .headers()
        .get_raw("Message-ID")
        .map(|raw| raw.trim().to_string())
}

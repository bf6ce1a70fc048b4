//! Status + keyword matching for the auto-responder.

use crate::replies::{
    canned_reply, StatusBucket, Topic, DEFAULT_REPLY, DOCUMENT_REPLY, GENERIC_ACKNOWLEDGEMENT,
    HELP_REPLY, STATUS_BUCKETS, THANK_YOU_REPLY, TOPIC_KEYWORDS,
};

/// Pick the automated reply for a client message on a case in `status`.
///
/// Both inputs are matched case-insensitively. The status selects a bucket,
/// the message selects a topic within it. A matched bucket with no topic
/// falls through to [`content_reply`]; an unmatched status gets the generic
/// acknowledgement.
pub fn respond(status: &str, message: &str) -> &'static str {
    let Some(bucket) = classify_status(status) else {
        return GENERIC_ACKNOWLEDGEMENT;
    };

    match classify_topic(message) {
        Some(topic) => canned_reply(bucket, topic),
        None => content_reply(message),
    }
}

/// Find the first bucket whose status predicates match.
pub fn classify_status(status: &str) -> Option<StatusBucket> {
    let status = status.to_lowercase();
    first_match(STATUS_BUCKETS, &status)
}

/// Find the first topic whose keywords appear in the message.
pub fn classify_topic(message: &str) -> Option<Topic> {
    let message = message.to_lowercase();
    first_match(TOPIC_KEYWORDS, &message)
}

/// Reply keyed only on message content.
pub fn content_reply(message: &str) -> &'static str {
    let message = message.to_lowercase();

    if message.contains("thank") {
        THANK_YOU_REPLY
    } else if message.contains("help") {
        HELP_REPLY
    } else if message.contains("document") {
        DOCUMENT_REPLY
    } else {
        DEFAULT_REPLY
    }
}

fn first_match<K: Copy>(table: &[(K, &[&str])], haystack: &str) -> Option<K> {
    table
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| haystack.contains(n)))
        .map(|(key, _)| *key)
}

//! Input record schemas.
//!
//! These mirror the shapes produced by the upstream dataset releases and the
//! external recovery step: message rows come from CSV exports (empty string
//! meaning "absent", Python-style `True`/`False` booleans), recovered content
//! comes as one JSON object per line.

use serde::Deserialize;

/// A user row from the curated (flagged) dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    /// External user identifier.
    pub userid: String,
    /// Display name.
    pub user_screen_name: String,
}

/// A message row from the curated dataset.
///
/// Optional fields may be absent or empty; the builders decide per row
/// whether an edge can be resolved (see the source-resolution tables in
/// `engine::interaction`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageRecord {
    /// External message identifier.
    pub tweetid: String,
    /// External id of the user who produced the row (retweeter/replier).
    pub userid: String,
    /// True if this row is a retweet.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_retweet: bool,
    /// Original author's external id, when the dataset knew it.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub retweet_userid: Option<String>,
    /// Original message id for retweets.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub retweet_tweetid: Option<String>,
    /// Message id being replied to.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub in_reply_to_tweetid: Option<String>,
    /// External id of the user being replied to.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub in_reply_to_userid: Option<String>,
}

/// One recovered-content record (a single NDJSON line).
#[derive(Debug, Clone, Deserialize)]
pub struct RecoveredRecord {
    /// External message identifier.
    pub id_str: String,
    /// The authoring user.
    pub user: RecoveredUser,
}

/// The author embedded in a recovered-content record.
#[derive(Debug, Clone, Deserialize)]
pub struct RecoveredUser {
    /// External user identifier.
    pub id_str: String,
    /// Display name.
    pub screen_name: String,
}

/// Accepts the boolean spellings CSV exports carry: `True`/`False`,
/// `true`/`false`, `1`/`0`, with absent or empty meaning false.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(value) = Option::<String>::deserialize(deserializer)? else {
        return Ok(false);
    };
    match value.trim() {
        "" | "0" => Ok(false),
        "1" => Ok(true),
        other => match other.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(serde::de::Error::custom(format!(
                "unrecognized boolean value '{other}'"
            ))),
        },
    }
}

/// Treats an empty or whitespace-only field as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_record_from_csv_row() {
        let data = "tweetid,userid,is_retweet,retweet_userid,retweet_tweetid,in_reply_to_tweetid,in_reply_to_userid\n\
                    t1,u1,True,u2,t0,,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: MessageRecord = reader.deserialize().next().unwrap().unwrap();
        assert!(row.is_retweet);
        assert_eq!(row.retweet_userid.as_deref(), Some("u2"));
        assert_eq!(row.retweet_tweetid.as_deref(), Some("t0"));
        assert!(row.in_reply_to_tweetid.is_none());
        assert!(row.in_reply_to_userid.is_none());
    }

    #[test]
    fn recovered_record_from_json_line() {
        let line = r#"{"id_str":"m1","user":{"id_str":"u7","screen_name":"ext"}}"#;
        let rec: RecoveredRecord = serde_json::from_str(line).unwrap();
        assert_eq!(rec.id_str, "m1");
        assert_eq!(rec.user.id_str, "u7");
        assert_eq!(rec.user.screen_name, "ext");
    }

    #[test]
    fn lenient_bool_spellings() {
        for (text, expected) in [("true", true), ("False", false), ("1", true), ("", false)] {
            let data = format!("tweetid,userid,is_retweet\nt1,u1,{text}\n");
            let mut reader = csv::Reader::from_reader(data.as_bytes());
            let row: MessageRecord = reader.deserialize().next().unwrap().unwrap();
            assert_eq!(row.is_retweet, expected, "spelling {text:?}");
        }
    }
}

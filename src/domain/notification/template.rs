//! Notification template registry
//!
//! Every `(type, subtype)` pair the platform emits maps to one
//! `NotificationKind`; unknown pairs are rejected when dispatching.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    PitchSubmitted,
    PitchAccepted,
    PitchDeclined,
    PitchWithdrawn,
    OfferCreated,
    OfferAccepted,
    OfferDeclined,
    OfferWithdrawn,
    TeamInvite,
    DaftarInvite,
    ScoutCollaboration,
    AnalysisSubmitted,
}

/// Rendered e-mail content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 12] = [
        NotificationKind::PitchSubmitted,
        NotificationKind::PitchAccepted,
        NotificationKind::PitchDeclined,
        NotificationKind::PitchWithdrawn,
        NotificationKind::OfferCreated,
        NotificationKind::OfferAccepted,
        NotificationKind::OfferDeclined,
        NotificationKind::OfferWithdrawn,
        NotificationKind::TeamInvite,
        NotificationKind::DaftarInvite,
        NotificationKind::ScoutCollaboration,
        NotificationKind::AnalysisSubmitted,
    ];

    pub fn type_and_subtype(self) -> (&'static str, &'static str) {
        match self {
            NotificationKind::PitchSubmitted => ("pitch", "submitted"),
            NotificationKind::PitchAccepted => ("pitch", "accepted"),
            NotificationKind::PitchDeclined => ("pitch", "declined"),
            NotificationKind::PitchWithdrawn => ("pitch", "withdrawn"),
            NotificationKind::OfferCreated => ("offer", "created"),
            NotificationKind::OfferAccepted => ("offer", "accepted"),
            NotificationKind::OfferDeclined => ("offer", "declined"),
            NotificationKind::OfferWithdrawn => ("offer", "withdrawn"),
            NotificationKind::TeamInvite => ("team", "invite"),
            NotificationKind::DaftarInvite => ("daftar", "invite"),
            NotificationKind::ScoutCollaboration => ("scout", "collaboration"),
            NotificationKind::AnalysisSubmitted => ("analysis", "submitted"),
        }
    }

    pub fn parse(notification_type: &str, subtype: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_and_subtype() == (notification_type, subtype))
    }

    /// Render subject and HTML body from the stored payload.
    ///
    /// Every payload value is HTML-escaped before it reaches the body; the
    /// subject is plain text with control characters flattened.
    pub fn render(self, payload: &Value, recipient_name: &str) -> RenderedEmail {
        let pitch = escaped(payload, "pitchName");
        let scout = escaped(payload, "scoutName");
        let daftar = escaped(payload, "daftarName");
        let actor = escaped(payload, "actorName");

        let subject = match self {
            NotificationKind::PitchSubmitted => format!("New pitch received: {}", field(payload, "pitchName")),
            NotificationKind::PitchAccepted => format!("Your pitch {} was accepted", field(payload, "pitchName")),
            NotificationKind::PitchDeclined => format!("Update on your pitch {}", field(payload, "pitchName")),
            NotificationKind::PitchWithdrawn => format!("Pitch withdrawn: {}", field(payload, "pitchName")),
            NotificationKind::OfferCreated => format!("New offer for {}", field(payload, "pitchName")),
            NotificationKind::OfferAccepted => format!("Offer accepted: {}", field(payload, "pitchName")),
            NotificationKind::OfferDeclined => format!("Offer declined: {}", field(payload, "pitchName")),
            NotificationKind::OfferWithdrawn => format!("Offer withdrawn: {}", field(payload, "pitchName")),
            NotificationKind::TeamInvite => format!("You are invited to join {}", field(payload, "pitchName")),
            NotificationKind::DaftarInvite => format!("You are invited to join {}", field(payload, "daftarName")),
            NotificationKind::ScoutCollaboration => {
                format!("Collaboration request for {}", field(payload, "scoutName"))
            }
            NotificationKind::AnalysisSubmitted => format!("New analysis on {}", field(payload, "pitchName")),
        };

        let body = match self {
            NotificationKind::PitchSubmitted => {
                format!("<p><b>{}</b> was submitted to <b>{}</b>.</p>", pitch, scout)
            }
            NotificationKind::PitchAccepted => {
                format!("<p>Congratulations! <b>{}</b> was accepted in <b>{}</b>.</p>", pitch, scout)
            }
            NotificationKind::PitchDeclined => {
                format!("<p><b>{}</b> was not selected in <b>{}</b>.</p>", pitch, scout)
            }
            NotificationKind::PitchWithdrawn => {
                format!("<p>The founders withdrew <b>{}</b> from <b>{}</b>.</p>", pitch, scout)
            }
            NotificationKind::OfferCreated => format!(
                "<p>{} sent an offer for <b>{}</b>:</p><blockquote>{}</blockquote>",
                actor,
                pitch,
                escaped(payload, "description")
            ),
            NotificationKind::OfferAccepted => {
                format!("<p>The founders of <b>{}</b> accepted your offer.</p>", pitch)
            }
            NotificationKind::OfferDeclined => {
                format!("<p>The founders of <b>{}</b> declined your offer.</p>", pitch)
            }
            NotificationKind::OfferWithdrawn => {
                format!("<p>{} withdrew the offer for <b>{}</b>.</p>", actor, pitch)
            }
            NotificationKind::TeamInvite => format!(
                "<p>{} invited you to the team of <b>{}</b> as {}.</p>\
                 <p><a href=\"{}\">Accept</a> | <a href=\"{}\">Decline</a></p>",
                actor,
                pitch,
                escaped(payload, "designation"),
                escaped(payload, "acceptUrl"),
                escaped(payload, "declineUrl")
            ),
            NotificationKind::DaftarInvite => format!(
                "<p>{} invited you to <b>{}</b> as {}.</p>",
                actor,
                daftar,
                escaped(payload, "designation")
            ),
            NotificationKind::ScoutCollaboration => format!(
                "<p><b>{}</b> invited <b>{}</b> to co-run the scout <b>{}</b>.</p>",
                escaped(payload, "ownerDaftarName"),
                daftar,
                scout
            ),
            NotificationKind::AnalysisSubmitted => {
                format!("<p>{} submitted an analysis for <b>{}</b>.</p>", actor, pitch)
            }
        };

        RenderedEmail {
            subject: subject.chars().map(|c| if c.is_control() { ' ' } else { c }).collect(),
            html: format!("<p>Hi {},</p>{}", escape_html(recipient_name), body),
        }
    }
}

fn field<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or("")
}

fn escaped(payload: &Value, key: &str) -> String {
    escape_html(field(payload, key))
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_kind_should_round_trip_through_its_type_pair() {
        for kind in NotificationKind::ALL {
            let (t, s) = kind.type_and_subtype();
            assert_eq!(NotificationKind::parse(t, s), Some(kind));
        }
    }

    #[test]
    fn unknown_pair_should_not_parse() {
        assert_eq!(NotificationKind::parse("pitch", "exploded"), None);
        assert_eq!(NotificationKind::parse("Offer", "Accepted"), None);
    }

    #[test]
    fn team_invite_should_carry_action_links() {
        let payload = json!({
            "pitchName": "Chai Point",
            "actorName": "Asha",
            "designation": "CTO",
            "acceptUrl": "https://app/invite?token=a",
            "declineUrl": "https://app/invite?token=d"
        });

        let email = NotificationKind::TeamInvite.render(&payload, "Ravi");

        assert_eq!(email.subject, "You are invited to join Chai Point");
        assert!(email.html.starts_with("<p>Hi Ravi,</p>"));
        assert!(email.html.contains("https://app/invite?token=a"));
        assert!(email.html.contains("https://app/invite?token=d"));
    }

    #[test]
    fn markup_in_payload_should_be_escaped() {
        // Arrange
        let payload = json!({
            "pitchName": "<script>alert(1)</script>",
            "scoutName": "<a href=\"https://evil.example/login\">Verify your account</a>"
        });

        // Act
        let email = NotificationKind::PitchSubmitted.render(&payload, "<b>Ravi</b>");

        // Assert
        assert!(email.html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(email.html.contains("&lt;a href=&quot;https://evil.example/login&quot;&gt;"));
        assert!(email.html.starts_with("<p>Hi &lt;b&gt;Ravi&lt;/b&gt;,</p>"));
        assert!(!email.html.contains("<script>"));
        assert!(!email.html.contains("<a href"));
    }

    #[test]
    fn invite_link_should_stay_inside_its_attribute() {
        let payload = json!({
            "acceptUrl": "https://app/invite?token=a&x=\"><img src=x>",
            "declineUrl": "https://app/invite?token=d"
        });

        let email = NotificationKind::TeamInvite.render(&payload, "Ravi");

        assert!(email.html.contains("href=\"https://app/invite?token=a&amp;x=&quot;&gt;&lt;img src=x&gt;\""));
        assert!(!email.html.contains("<img"));
    }

    #[test]
    fn subject_should_not_carry_line_breaks() {
        let payload = json!({ "pitchName": "Chai\r\nBcc: all@daftar.os" });

        let email = NotificationKind::OfferCreated.render(&payload, "Ravi");

        assert_eq!(email.subject, "New offer for Chai  Bcc: all@daftar.os");
    }

    #[test]
    fn missing_payload_fields_should_render_empty() {
        let email = NotificationKind::OfferAccepted.render(&json!({}), "Ravi");

        assert_eq!(email.subject, "Offer accepted: ");
    }
}

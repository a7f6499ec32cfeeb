use daftar_server::domain::notification::entity::notification_delivery::DeliveryStatus;
use daftar_server::domain::notification::mailer::MailError;
use daftar_server::domain::notification::template::NotificationKind;
use daftar_server::domain::notification::worker::{retry_delay, status_after_failure};
use daftar_server::domain::offer::entity::offer::{OfferAction, OfferStatus};
use daftar_server::domain::pitch::entity::pitch::{PitchAction, PitchStatus};
use daftar_server::utils::action_token::{ActionTokenError, ActionTokenSigner, InviteAction};
use serde_json::json;

mod pitch_flow {
    use super::*;

    #[test]
    fn draft_should_travel_to_accepted_and_take_offers() {
        // Arrange
        let draft = PitchStatus::Draft;

        // Act
        let inbox = draft.apply(PitchAction::Submit).unwrap();
        let accepted = inbox.apply(PitchAction::Accept).unwrap();

        // Assert
        assert_eq!(inbox, PitchStatus::Inbox);
        assert_eq!(accepted, PitchStatus::Accepted);
        assert!(accepted.accepts_offers());
        assert!(accepted.is_visible_to_investors());
        assert!(!draft.is_visible_to_investors());
    }

    #[test]
    fn declined_pitch_can_only_be_deleted() {
        let declined = PitchStatus::Inbox.apply(PitchAction::Decline).unwrap();

        for action in [PitchAction::Submit, PitchAction::Accept, PitchAction::Withdraw] {
            assert!(declined.apply(action).is_err(), "{:?}", action);
        }
        assert_eq!(
            declined.apply(PitchAction::Delete).unwrap(),
            PitchStatus::Deleted
        );
        assert!(!declined.accepts_offers());
    }

    #[test]
    fn deleted_pitch_should_be_terminal() {
        let deleted = PitchStatus::Draft.apply(PitchAction::Delete).unwrap();

        assert!(deleted.apply(PitchAction::Submit).is_err());
        assert!(deleted.apply(PitchAction::Delete).is_err());
    }
}

mod offer_flow {
    use super::*;

    #[test]
    fn settled_offer_should_not_change_again() {
        let accepted = OfferStatus::Pending.apply(OfferAction::Accept).unwrap();

        let result = accepted.apply(OfferAction::Withdraw);

        assert!(result.is_err());
    }
}

mod team_invite_link {
    use super::*;

    #[test]
    fn accept_link_should_carry_pitch_and_invitee() {
        // Arrange
        let signer = ActionTokenSigner::new("link-secret", 600);
        let issued_at = 1_700_000_000;

        // Act
        let token = signer.sign(12, 34, InviteAction::Accept, issued_at).unwrap();
        let claims = signer.verify(&token, issued_at + 30).unwrap();

        // Assert
        assert_eq!(claims.user_id, 12);
        assert_eq!(claims.pitch_id, 34);
        assert_eq!(claims.action, InviteAction::Accept);
    }

    #[test]
    fn link_should_expire_after_ttl() {
        let signer = ActionTokenSigner::new("link-secret", 600);
        let token = signer.sign(12, 34, InviteAction::Decline, 1_000).unwrap();

        let result = signer.verify(&token, 1_000 + 601);

        assert!(matches!(result, Err(ActionTokenError::Expired)));
    }
}

mod notification_delivery {
    use super::*;

    #[test]
    fn unknown_type_pair_should_not_parse() {
        assert_eq!(NotificationKind::parse("pitch", "exploded"), None);
        assert_eq!(NotificationKind::parse("offer", "invite"), None);
    }

    #[test]
    fn team_invite_mail_should_contain_both_links() {
        let payload = json!({
            "pitchName": "Kisan Credit",
            "actorName": "Ravi",
            "designation": "CTO",
            "acceptUrl": "https://app.daftar.os/pitch-invite?token=a",
            "declineUrl": "https://app.daftar.os/pitch-invite?token=d",
        });

        let email = NotificationKind::TeamInvite.render(&payload, "Meera");

        assert!(email.subject.contains("Kisan Credit"));
        assert!(email.html.contains("token=a"));
        assert!(email.html.contains("token=d"));
    }

    #[test]
    fn retries_should_back_off_then_give_up() {
        let transient = MailError::Transient("503".to_string());

        assert!(retry_delay(2) > retry_delay(1));
        assert_eq!(retry_delay(30), retry_delay(40));
        assert_eq!(status_after_failure(1, &transient, 5), DeliveryStatus::Failed);
        assert_eq!(status_after_failure(5, &transient, 5), DeliveryStatus::Dead);
        assert_eq!(
            status_after_failure(1, &MailError::Permanent("bad address".to_string()), 5),
            DeliveryStatus::Dead
        );
    }
}

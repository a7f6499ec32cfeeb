pub mod config;
pub mod domain;
pub mod global;
pub mod state;
pub mod utils;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        domain::health::handler::health_check,
        domain::user::handler::signup,
        domain::user::handler::get_profile,
        domain::user::handler::update_profile,
        domain::user::handler::withdraw,
        domain::daftar::handler::create_daftar,
        domain::daftar::handler::list_my_daftars,
        domain::daftar::handler::get_daftar,
        domain::daftar::handler::invite_investor,
        domain::daftar::handler::respond_to_invite,
        domain::scout::handler::create_scout,
        domain::scout::handler::list_daftar_scouts,
        domain::scout::handler::list_open_scouts,
        domain::scout::handler::get_scout,
        domain::scout::handler::update_scout,
        domain::scout::handler::change_status,
        domain::scout::handler::invite_collaborator,
        domain::scout::handler::accept_collaboration,
        domain::scout::handler::get_insights,
        domain::pitch::handler::create_pitch,
        domain::pitch::handler::list_my_pitches,
        domain::pitch::handler::get_pitch,
        domain::pitch::handler::delete_pitch,
        domain::pitch::handler::save_answer,
        domain::pitch::handler::submit_pitch,
        domain::pitch::handler::withdraw_pitch,
        domain::pitch::handler::decide_pitch,
        domain::pitch::handler::list_scout_pitches,
        domain::pitch::handler::invite_member,
        domain::pitch::handler::list_team,
        domain::pitch::handler::respond_team_invite,
        domain::offer::handler::create_offer,
        domain::offer::handler::list_offers,
        domain::offer::handler::respond_to_offer,
        domain::offer::handler::withdraw_offer,
        domain::analysis::handler::submit_analysis,
        domain::analysis::handler::save_analysis_draft,
        domain::analysis::handler::get_my_analysis,
        domain::analysis::handler::list_team_analyses,
        domain::document::handler::register_document,
        domain::document::handler::list_documents,
        domain::document::handler::toggle_privacy,
        domain::document::handler::delete_document,
        domain::notification::handler::list_my_notifications,
    ),
    components(
        schemas(
            domain::health::dto::HealthStatus,
            domain::health::dto::HealthState,
            domain::health::dto::HealthChecks,
            domain::health::dto::CheckResult,
            domain::health::dto::MailQueueCheck,
            domain::user::entity::user::UserRole,
            domain::user::entity::user::Gender,
            domain::user::dto::SignupRequest,
            domain::user::dto::SignupResponse,
            domain::user::dto::SuccessSignupResponse,
            domain::user::dto::ProfileResponse,
            domain::user::dto::SuccessProfileResponse,
            domain::user::dto::UpdateProfileRequest,
            domain::daftar::entity::daftar_investor::DaftarMemberStatus,
            domain::daftar::dto::CreateDaftarRequest,
            domain::daftar::dto::DaftarResponse,
            domain::daftar::dto::SuccessDaftarResponse,
            domain::daftar::dto::SuccessDaftarListResponse,
            domain::daftar::dto::DaftarMemberItem,
            domain::daftar::dto::DaftarDetailResponse,
            domain::daftar::dto::SuccessDaftarDetailResponse,
            domain::daftar::dto::InviteInvestorRequest,
            domain::daftar::dto::InviteInvestorResponse,
            domain::daftar::dto::SuccessInviteInvestorResponse,
            domain::daftar::dto::RespondInviteRequest,
            domain::scout::entity::scout::ScoutStatus,
            domain::scout::dto::CreateScoutRequest,
            domain::scout::dto::UpdateScoutRequest,
            domain::scout::dto::ChangeScoutStatusRequest,
            domain::scout::dto::InviteCollaboratorRequest,
            domain::scout::dto::ScoutResponse,
            domain::scout::dto::ScoutQuestionItem,
            domain::scout::dto::ScoutDetailResponse,
            domain::scout::dto::SuccessScoutDetailResponse,
            domain::scout::dto::SuccessScoutListResponse,
            domain::scout::dto::DaftarScoutItem,
            domain::scout::dto::SuccessDaftarScoutListResponse,
            domain::scout::dto::SuccessScoutInsightsResponse,
            domain::scout::insight::StatusCount,
            domain::scout::insight::GenderShare,
            domain::scout::insight::NpsSummary,
            domain::scout::insight::ScoutInsights,
            domain::pitch::entity::pitch::PitchStatus,
            domain::pitch::entity::pitch::InvestorStatus,
            domain::pitch::entity::pitch_team::TeamMemberStatus,
            domain::pitch::dto::CreatePitchRequest,
            domain::pitch::dto::PitchResponse,
            domain::pitch::dto::SuccessPitchResponse,
            domain::pitch::dto::SuccessPitchListResponse,
            domain::pitch::dto::PitchAnswerItem,
            domain::pitch::dto::TeamMemberItem,
            domain::pitch::dto::PitchDetailResponse,
            domain::pitch::dto::SuccessPitchDetailResponse,
            domain::pitch::dto::SaveAnswerRequest,
            domain::pitch::dto::SuccessPitchAnswerResponse,
            domain::pitch::dto::SubmitPitchRequest,
            domain::pitch::dto::DecidePitchRequest,
            domain::pitch::dto::InviteMemberRequest,
            domain::pitch::dto::InviteMemberResponse,
            domain::pitch::dto::SuccessInviteMemberResponse,
            domain::pitch::dto::RespondTeamInviteRequest,
            domain::pitch::dto::TeamInviteResult,
            domain::pitch::dto::SuccessTeamInviteResultResponse,
            domain::pitch::dto::SuccessTeamListResponse,
            domain::offer::entity::offer::OfferStatus,
            domain::offer::dto::CreateOfferRequest,
            domain::offer::dto::RespondOfferRequest,
            domain::offer::dto::OfferResponse,
            domain::offer::dto::SuccessOfferResponse,
            domain::offer::dto::SuccessOfferListResponse,
            domain::analysis::entity::investor_pitch::AnalysisStatus,
            domain::analysis::dto::SubmitAnalysisRequest,
            domain::analysis::dto::SaveAnalysisDraftRequest,
            domain::analysis::dto::AnalysisResponse,
            domain::analysis::dto::SuccessAnalysisResponse,
            domain::analysis::dto::SuccessAnalysisListResponse,
            domain::document::dto::DocumentBucket,
            domain::document::dto::RegisterDocumentRequest,
            domain::document::dto::DocumentResponse,
            domain::document::dto::SuccessDocumentResponse,
            domain::document::dto::SuccessDocumentListResponse,
            domain::notification::entity::notification::NotificationRole,
            domain::notification::entity::notification_delivery::DeliveryStatus,
            domain::notification::dto::NotificationItem,
            domain::notification::dto::SuccessNotificationListResponse,
            utils::response::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "헬스체크 API"),
        (name = "User", description = "가입/프로필 API"),
        (name = "Daftar", description = "투자자 조직(다프타) API"),
        (name = "Scout", description = "투자 프로그램(스카우트) API"),
        (name = "Pitch", description = "피치/팀 API"),
        (name = "Offer", description = "오퍼 API"),
        (name = "Analysis", description = "투자자 분석 API"),
        (name = "Document", description = "피치 문서 API"),
        (name = "Notification", description = "알림 API")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

fn api_routes() -> Router<AppState> {
    use domain::{analysis, daftar, document, notification, offer, pitch, scout, user};

    Router::new()
        // User
        .route("/users/signup", post(user::handler::signup))
        .route(
            "/users/me",
            get(user::handler::get_profile)
                .patch(user::handler::update_profile)
                .delete(user::handler::withdraw),
        )
        // Daftar
        .route(
            "/daftars",
            post(daftar::handler::create_daftar).get(daftar::handler::list_my_daftars),
        )
        .route("/daftars/:daftar_id", get(daftar::handler::get_daftar))
        .route(
            "/daftars/:daftar_id/invitations",
            post(daftar::handler::invite_investor),
        )
        .route(
            "/daftars/:daftar_id/invitations/respond",
            post(daftar::handler::respond_to_invite),
        )
        .route(
            "/daftars/:daftar_id/scouts",
            post(scout::handler::create_scout).get(scout::handler::list_daftar_scouts),
        )
        // Scout
        .route("/scouts/open", get(scout::handler::list_open_scouts))
        .route(
            "/scouts/:scout_id",
            get(scout::handler::get_scout).patch(scout::handler::update_scout),
        )
        .route("/scouts/:scout_id/status", patch(scout::handler::change_status))
        .route(
            "/scouts/:scout_id/collaborators",
            post(scout::handler::invite_collaborator),
        )
        .route(
            "/scouts/:scout_id/collaborators/:daftar_id/accept",
            post(scout::handler::accept_collaboration),
        )
        .route("/scouts/:scout_id/insights", get(scout::handler::get_insights))
        .route(
            "/scouts/:scout_id/pitches",
            get(pitch::handler::list_scout_pitches),
        )
        // Pitch
        .route(
            "/pitches",
            post(pitch::handler::create_pitch).get(pitch::handler::list_my_pitches),
        )
        .route(
            "/pitches/:pitch_id",
            get(pitch::handler::get_pitch).delete(pitch::handler::delete_pitch),
        )
        .route(
            "/pitches/:pitch_id/answers",
            put(pitch::handler::save_answer),
        )
        .route("/pitches/:pitch_id/submit", post(pitch::handler::submit_pitch))
        .route(
            "/pitches/:pitch_id/withdraw",
            post(pitch::handler::withdraw_pitch),
        )
        .route(
            "/pitches/:pitch_id/decision",
            post(pitch::handler::decide_pitch),
        )
        .route(
            "/pitches/:pitch_id/team",
            post(pitch::handler::invite_member).get(pitch::handler::list_team),
        )
        .route(
            "/pitch-invitations/respond",
            post(pitch::handler::respond_team_invite),
        )
        // Offer
        .route(
            "/pitches/:pitch_id/offers",
            post(offer::handler::create_offer).get(offer::handler::list_offers),
        )
        .route(
            "/offers/:offer_id/respond",
            post(offer::handler::respond_to_offer),
        )
        .route(
            "/offers/:offer_id/withdraw",
            post(offer::handler::withdraw_offer),
        )
        // Analysis
        .route(
            "/pitches/:pitch_id/analysis",
            post(analysis::handler::submit_analysis),
        )
        .route(
            "/pitches/:pitch_id/analysis/draft",
            put(analysis::handler::save_analysis_draft),
        )
        .route(
            "/pitches/:pitch_id/analysis/me",
            get(analysis::handler::get_my_analysis),
        )
        .route(
            "/pitches/:pitch_id/analyses",
            get(analysis::handler::list_team_analyses),
        )
        // Document
        .route(
            "/pitches/:pitch_id/documents",
            post(document::handler::register_document).get(document::handler::list_documents),
        )
        .route(
            "/documents/:document_id",
            delete(document::handler::delete_document),
        )
        .route(
            "/documents/:document_id/privacy",
            patch(document::handler::toggle_privacy),
        )
        // Notification
        .route(
            "/notifications",
            get(notification::handler::list_my_notifications),
        )
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(domain::health::health_check))
        .nest("/api/v1", api_routes())
        .layer(middleware::from_fn(global::middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

use utoipa::OpenApi;

use crate::endpoints::{gamification, guests, invitations, invites};
use crate::schemas;
use crate::services::media::MediaUrls;

#[derive(OpenApi)]
#[openapi(
    info(title = "Digital Invite API", description = "Wedding invitations, RSVPs and guest media"),
    paths(
        invitations::invite_detail,
        invitations::respond_invite,
        invitations::complete_profile,
        invitations::qr_png,
        invitations::qr_svg,
        gamification::leaderboard,
        gamification::achievements,
        invites::list_invites,
        invites::create_invite,
        invites::get_invite,
        invites::update_invite,
        invites::delete_invite,
        guests::list_guests,
        guests::create_guest,
        guests::get_guest,
        guests::update_guest,
        guests::delete_guest,
    ),
    components(schemas(
        MediaUrls,
        schemas::InviteDetailResponse,
        schemas::GuestProfile,
        schemas::RsvpRequest,
        schemas::RsvpResponse,
        schemas::CompleteProfileRequest,
        schemas::CompleteProfileResponse,
        schemas::GamificationResponse,
        schemas::LeaderboardEntry,
        schemas::CreateInviteRequest,
        schemas::UpdateInviteRequest,
        schemas::InviteResponse,
        schemas::GuestResponse,
    )),
    tags(
        (name = "Invitations", description = "Guest-facing invitation pages"),
        (name = "Gamification", description = "Points, badges and leaderboard"),
        (name = "Invites", description = "Staff invite administration"),
        (name = "Guests", description = "Staff guest administration")
    )
)]
pub struct ApiDoc;

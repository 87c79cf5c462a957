use ntex::web;

/// Configures the LINE webhook routes.
///
/// These routes are public endpoints: the webhook authenticates each delivery
/// with its signature instead of a session.
///
/// # Routes
/// - `GET /` - Liveness check
/// - `POST /webhook` - LINE webhook receiver
pub fn line(cfg: &mut web::ServiceConfig) {
    cfg.service((super::line::health, super::line::receive));
}

pub mod auth;

pub mod behaviors;

pub mod classrooms;

pub mod legacy;

pub mod presets;

pub mod realtime;

pub mod sounds;

pub mod system;

pub use auth::configure_auth_routes;
pub use behaviors::configure_behavior_routes;
pub use classrooms::configure_classroom_routes;
pub use legacy::configure_legacy_routes;
pub use presets::configure_preset_routes;
pub use realtime::configure_realtime_routes;
pub use sounds::configure_sound_routes;
pub use system::configure_system_routes;

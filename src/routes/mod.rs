pub mod attendance;

pub mod auth;

pub mod classes;

pub mod dashboard;

pub mod devices;

pub mod events;

pub mod imports;

pub mod provisioning;

pub mod schools;

pub mod students;

pub mod users;

pub use attendance::configure_attendance_routes;
pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use dashboard::configure_dashboard_routes;
pub use devices::configure_device_routes;
pub use events::configure_event_routes;
pub use imports::configure_import_routes;
pub use provisioning::configure_provisioning_routes;
pub use schools::configure_school_routes;
pub use students::configure_student_routes;
pub use users::configure_user_routes;

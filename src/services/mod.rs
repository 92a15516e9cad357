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

pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use classes::ClassService;
pub use dashboard::DashboardService;
pub use devices::DeviceService;
pub use events::EventService;
pub use imports::ImportService;
pub use provisioning::ProvisioningService;
pub use schools::SchoolService;
pub use students::StudentService;
pub use users::UserService;

//! 预导入模块，方便使用

pub use super::attendance_events::{
    ActiveModel as AttendanceEventActiveModel, Entity as AttendanceEvents,
    Model as AttendanceEventModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::daily_attendance::{
    ActiveModel as DailyAttendanceActiveModel, Entity as DailyAttendances,
    Model as DailyAttendanceModel,
};
pub use super::devices::{
    ActiveModel as DeviceActiveModel, Entity as Devices, Model as DeviceModel,
};
pub use super::provisioning_logs::{
    ActiveModel as ProvisioningLogActiveModel, Entity as ProvisioningLogs,
    Model as ProvisioningLogModel,
};
pub use super::schools::{
    ActiveModel as SchoolActiveModel, Entity as Schools, Model as SchoolModel,
};
pub use super::student_device_links::{
    ActiveModel as DeviceLinkActiveModel, Entity as StudentDeviceLinks, Model as DeviceLinkModel,
};
pub use super::student_provisionings::{
    ActiveModel as ProvisioningActiveModel, Entity as StudentProvisionings,
    Model as ProvisioningModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};

pub mod calendar_commands;
pub mod equipment_commands;
pub mod request_commands;
pub mod session_commands;
pub mod team_commands;
pub mod utils;
pub mod work_center_commands;

pub use calendar_commands::{CalendarArgs, handle_calendar_command};
pub use equipment_commands::{EquipmentAction, handle_equipment_command};
pub use request_commands::{RequestAction, handle_request_command};
pub use session_commands::{SessionAction, handle_session_command};
pub use team_commands::{TeamAction, handle_team_command};
pub use work_center_commands::{WorkCenterAction, handle_work_center_command};

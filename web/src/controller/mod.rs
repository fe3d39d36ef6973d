pub(crate) mod health_check_controller;
pub(crate) mod message_controller;
pub(crate) mod resource_controller;
pub(crate) mod tool_controller;

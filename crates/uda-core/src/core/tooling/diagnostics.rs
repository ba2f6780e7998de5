pub mod commands {
    pub const CREATE: &str = "UDA101";
    pub const LIST: &str = "UDA102";
    pub const REMOVE: &str = "UDA103";
    pub const ACTIVATE: &str = "UDA201";
    pub const DEACTIVATE: &str = "UDA202";
    pub const INIT: &str = "UDA203";
    pub const INSTALL: &str = "UDA301";
    pub const RUN: &str = "UDA302";
    pub const SELF: &str = "UDA401";
    pub const MIRROR: &str = "UDA402";
}

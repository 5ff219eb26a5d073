//! Stable error codes attached to log lines and error reports

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MALFORMED_BODY: &str = "VALIDATION_1003";
}

pub mod authentication {
    pub const SESSION_INVALID: &str = "AUTH_2001";
    pub const INTROSPECTION_FAILED: &str = "AUTH_2002";
    pub const LOGIN_STATE_INVALID: &str = "AUTH_2003";
}

pub mod authorization {
    pub const NOT_OWNER: &str = "AUTHZ_3001";
}

pub mod resource {
    pub const NOT_FOUND: &str = "RESOURCE_4001";
    pub const CONFLICT: &str = "RESOURCE_4002";
}

pub mod storage {
    pub const BACKEND_FAILURE: &str = "STORE_5001";
    pub const CONSTRAINT_VIOLATION: &str = "STORE_5002";
    pub const REVISION_CONFLICT: &str = "STORE_5003";
}

pub mod upstream {
    pub const PROVIDER_UNREACHABLE: &str = "UPSTREAM_6001";
    pub const TOKEN_EXCHANGE_FAILED: &str = "UPSTREAM_6002";
    pub const CLIENT_SETUP_FAILED: &str = "UPSTREAM_6003";
}

pub mod system {
    pub const CONFIGURATION_INVALID: &str = "SYS_9001";
    pub const SERVER_FAILURE: &str = "SYS_9002";
    pub const INTERNAL_ERROR: &str = "SYS_9003";
}

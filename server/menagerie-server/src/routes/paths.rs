//! Route paths, in axum's `:param` syntax

pub mod auth {
    pub const WELCOME: &str = "/";
    pub const LOGIN: &str = "/login/";
    pub const OAUTH_CALLBACK: &str = "/oauth";
    pub const LOGOUT: &str = "/logout";
}

pub mod animals {
    pub const COLLECTION: &str = "/animals";
    pub const BY_ID: &str = "/animals/:animal_id";
}

pub mod zoos {
    pub const COLLECTION: &str = "/zoos";
    pub const BY_ID: &str = "/zoos/:zoo_id";
    pub const ANIMALS: &str = "/zoos/:zoo_id/animals";
    pub const ANIMAL_BY_ID: &str = "/zoos/:zoo_id/animals/:animal_id";
}

pub mod admin {
    pub const WIPE: &str = "/delete";
}

pub mod health {
    pub const HEALTH: &str = "/health";
}

pub mod docs {
    pub const SWAGGER_UI: &str = "/swagger-ui";
    pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
}

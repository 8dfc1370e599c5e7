/// Route component constants shared across crates
pub const HEALTHCHECK_ROUTE_COMPONENT: &str = "healthcheck";

pub const RECURRING_EVENTS_ROUTE_COMPONENT: &str = "recurring-events";
pub const RECURRING_EVENTS_ROUTE_PREFIX: &str =
    const_str::concat!("/", RECURRING_EVENTS_ROUTE_COMPONENT);

pub const SERIES_ROUTE_COMPONENT: &str = "series";
pub const SERIES_ROUTE_PREFIX: &str =
    const_str::concat!(RECURRING_EVENTS_ROUTE_PREFIX, "/", SERIES_ROUTE_COMPONENT);

pub const INTAKE_CLASSIFICATION_ROUTE_COMPONENT: &str = "intake-classification";
pub const INTAKE_CLASSIFICATION_ROUTE_PREFIX: &str =
    const_str::concat!("/", INTAKE_CLASSIFICATION_ROUTE_COMPONENT);

pub const INTAKE_TICKETS_ROUTE_COMPONENT: &str = "intake-tickets";
pub const INTAKE_TICKETS_ROUTE_PREFIX: &str =
    const_str::concat!("/", INTAKE_TICKETS_ROUTE_COMPONENT);

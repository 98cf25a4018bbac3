//! The static resource table

use super::types::{
    ApiGeneration, CursorFilter, LinkLocation, NormalizerKind, PaginationKind, ParentKind,
    Replication, RequestProfile, ResourceDescriptor,
};

/// Metric names that become legacy timeline streams, with their stream names
pub const EVENT_MAPPINGS: [(&str, &str); 10] = [
    ("Received Email", "receive"),
    ("Clicked Email", "click"),
    ("Opened Email", "open"),
    ("Bounced Email", "bounce"),
    ("Unsubscribed", "unsubscribe"),
    ("Marked Email as Spam", "mark_as_spam"),
    ("Unsubscribed from List", "unsub_list"),
    ("Subscribed to List", "subscribe_list"),
    ("Updated Email Preferences", "update_email_preferences"),
    ("Dropped Email", "dropped_email"),
];

const LEGACY: RequestProfile = RequestProfile {
    api: ApiGeneration::Legacy,
    sort: None,
    filter: CursorFilter::None,
    extra_params: &[],
};

const REVISIONED: RequestProfile = RequestProfile {
    api: ApiGeneration::Revisioned,
    sort: None,
    filter: CursorFilter::None,
    extra_params: &[],
};

const BY_ID: &[&str] = &["id"];

const LINKS: PaginationKind = PaginationKind::Link(LinkLocation::BodyLinks);

/// Shape shared by every legacy metric timeline
const TIMELINE: ResourceDescriptor = ResourceDescriptor {
    name: "",
    key_properties: BY_ID,
    path: "/api/v1/metric/{metric_id}/timeline",
    records_path: "data",
    pagination: PaginationKind::Link(LinkLocation::NextToken),
    normalizer: NormalizerKind::Passthrough,
    replication: Replication::Incremental,
    request: RequestProfile {
        sort: Some("asc"),
        filter: CursorFilter::SinceEpoch,
        ..LEGACY
    },
};

const fn timeline(name: &'static str) -> ResourceDescriptor {
    ResourceDescriptor { name, ..TIMELINE }
}

static RESOURCES: [ResourceDescriptor; 21] = [
    ResourceDescriptor {
        name: "global_exclusions",
        key_properties: &["email"],
        path: "/api/v1/people/exclusions",
        records_path: "data",
        pagination: PaginationKind::PageIndex,
        normalizer: NormalizerKind::Passthrough,
        replication: Replication::Full,
        request: LEGACY,
    },
    ResourceDescriptor {
        name: "lists",
        key_properties: &["uuid"],
        path: "/api/v1/lists",
        records_path: "data",
        pagination: PaginationKind::PageIndex,
        normalizer: NormalizerKind::Passthrough,
        replication: Replication::Full,
        request: LEGACY,
    },
    ResourceDescriptor {
        name: "metrics",
        key_properties: BY_ID,
        path: "/api/v1/metrics",
        records_path: "data",
        pagination: PaginationKind::PageIndex,
        normalizer: NormalizerKind::Passthrough,
        replication: Replication::Full,
        request: LEGACY,
    },
    ResourceDescriptor {
        name: "list_members",
        key_properties: &["email"],
        path: "/api/v2/group/{list_id}/members/all",
        records_path: "records",
        pagination: PaginationKind::Marker,
        normalizer: NormalizerKind::Passthrough,
        replication: Replication::Child(ParentKind::List),
        request: LEGACY,
    },
    ResourceDescriptor {
        name: "events",
        key_properties: BY_ID,
        path: "/api/events/",
        records_path: "data",
        pagination: LINKS,
        normalizer: NormalizerKind::Events,
        replication: Replication::Incremental,
        request: RequestProfile {
            sort: Some("datetime"),
            filter: CursorFilter::GreaterThan("datetime"),
            ..REVISIONED
        },
    },
    ResourceDescriptor {
        name: "profiles",
        key_properties: BY_ID,
        path: "/api/profiles/",
        records_path: "data",
        pagination: LINKS,
        normalizer: NormalizerKind::Profiles,
        replication: Replication::Incremental,
        request: RequestProfile {
            sort: Some("updated"),
            filter: CursorFilter::GreaterThan("updated"),
            ..REVISIONED
        },
    },
    ResourceDescriptor {
        name: "global_exclusions2",
        key_properties: BY_ID,
        path: "/api/profiles/",
        records_path: "data",
        pagination: LINKS,
        normalizer: NormalizerKind::Profiles,
        replication: Replication::Full,
        request: RequestProfile {
            sort: Some("-subscriptions.email.marketing.suppression.timestamp"),
            filter: CursorFilter::GreaterThan("subscriptions.email.marketing.suppression.timestamp"),
            extra_params: &[("additional-fields[profile]", "subscriptions")],
            ..REVISIONED
        },
    },
    ResourceDescriptor {
        name: "lists2",
        key_properties: BY_ID,
        path: "/api/lists/",
        records_path: "data",
        pagination: LINKS,
        normalizer: NormalizerKind::Passthrough,
        replication: Replication::Full,
        request: REVISIONED,
    },
    ResourceDescriptor {
        name: "metrics2",
        key_properties: BY_ID,
        path: "/api/metrics/",
        records_path: "data",
        pagination: LINKS,
        normalizer: NormalizerKind::Passthrough,
        replication: Replication::Full,
        request: REVISIONED,
    },
    ResourceDescriptor {
        name: "list_members2",
        key_properties: BY_ID,
        path: "/api/lists/{list_id}/profiles/",
        records_path: "data",
        pagination: LINKS,
        normalizer: NormalizerKind::Membership,
        replication: Replication::Child(ParentKind::List),
        request: RequestProfile {
            sort: Some("joined_group_at"),
            ..REVISIONED
        },
    },
    ResourceDescriptor {
        name: "segment_members",
        key_properties: BY_ID,
        path: "/api/segments/{segment_id}/profiles/",
        records_path: "data",
        pagination: LINKS,
        normalizer: NormalizerKind::Membership,
        replication: Replication::Child(ParentKind::Segment),
        request: RequestProfile {
            sort: Some("joined_group_at"),
            ..REVISIONED
        },
    },
    timeline("receive"),
    timeline("click"),
    timeline("open"),
    timeline("bounce"),
    timeline("unsubscribe"),
    timeline("mark_as_spam"),
    timeline("unsub_list"),
    timeline("subscribe_list"),
    timeline("update_email_preferences"),
    timeline("dropped_email"),
];

/// Look up a resource by stream name
pub fn descriptor(name: &str) -> Option<&'static ResourceDescriptor> {
    RESOURCES.iter().find(|descriptor| descriptor.name == name)
}

/// Every known resource, fixed streams first
pub fn all() -> &'static [ResourceDescriptor] {
    &RESOURCES
}

/// Stream name of the timeline for a metric, if it is one we replicate
pub fn stream_for_metric(metric_name: &str) -> Option<&'static str> {
    EVENT_MAPPINGS
        .iter()
        .find(|(metric, _)| *metric == metric_name)
        .map(|(_, stream)| *stream)
}

mod common;

use chrono::Duration;
use common::{at, service, with_option};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{from_str, json, to_value};
use serde_test::{Token, assert_de_tokens_error, assert_tokens};
use timebook_core::errors::BookingError;
use timebook_core::models::appointment::{
    Appointment, AppointmentDetails, AppointmentStatus, CreateAppointmentRequest,
};
use timebook_core::models::caller::{Caller, CallerScope, Role};
use timebook_core::models::time_range::{TimeRange, overlaps};
use timebook_core::parse::{RangeBound, parse_instant, parse_range_bound};
use uuid::Uuid;

#[rstest]
#[case(0, 10, 5, 15, true)]
#[case(0, 10, 10, 20, false)]
#[case(10, 20, 0, 10, false)]
#[case(0, 10, 2, 8, true)]
#[case(2, 8, 0, 10, true)]
#[case(0, 10, 0, 10, true)]
#[case(0, 10, 11, 12, false)]
fn test_overlap_is_half_open(
    #[case] a: i32,
    #[case] b: i32,
    #[case] c: i32,
    #[case] d: i32,
    #[case] expected: bool,
) {
    assert_eq!(overlaps(a, b, c, d), expected);

    let first = TimeRange::new(at(1, 10, 0) + Duration::minutes(a.into()), at(1, 10, 0) + Duration::minutes(b.into()));
    let second = TimeRange::new(at(1, 10, 0) + Duration::minutes(c.into()), at(1, 10, 0) + Duration::minutes(d.into()));
    assert_eq!(first.overlaps(&second), expected);
    assert_eq!(second.overlaps(&first), expected);
}

#[test]
fn test_checked_range_rejects_inverted_and_empty() {
    assert!(TimeRange::checked(at(1, 10, 0), at(1, 11, 0)).is_ok());

    let empty = TimeRange::checked(at(1, 10, 0), at(1, 10, 0));
    assert!(matches!(empty, Err(BookingError::Validation(_))));

    let inverted = TimeRange::checked(at(1, 11, 0), at(1, 10, 0));
    assert!(matches!(inverted, Err(BookingError::Validation(_))));
}

#[test]
fn test_status_tokens() {
    assert_tokens(
        &AppointmentStatus::Pending,
        &[Token::UnitVariant {
            name: "AppointmentStatus",
            variant: "pending",
        }],
    );
    assert_tokens(
        &AppointmentStatus::Cancelled,
        &[Token::UnitVariant {
            name: "AppointmentStatus",
            variant: "cancelled",
        }],
    );
    assert_de_tokens_error::<AppointmentStatus>(
        &[Token::UnitVariant {
            name: "AppointmentStatus",
            variant: "done",
        }],
        "unknown variant `done`, expected one of `pending`, `confirmed`, `rejected`, `cancelled`",
    );
}

#[rstest]
#[case("pending", AppointmentStatus::Pending)]
#[case("confirmed", AppointmentStatus::Confirmed)]
#[case("rejected", AppointmentStatus::Rejected)]
#[case("cancelled", AppointmentStatus::Cancelled)]
fn test_status_parses_from_storage_text(#[case] text: &str, #[case] status: AppointmentStatus) {
    assert_eq!(text.parse::<AppointmentStatus>().unwrap(), status);
    assert_eq!(status.as_str(), text);
}

#[test]
fn test_only_pending_and_confirmed_are_active() {
    assert!(AppointmentStatus::Pending.is_active());
    assert!(AppointmentStatus::Confirmed.is_active());
    assert!(!AppointmentStatus::Rejected.is_active());
    assert!(!AppointmentStatus::Cancelled.is_active());
    assert!("archived".parse::<AppointmentStatus>().is_err());
}

#[test]
fn test_details_flatten_appointment_fields() {
    let master_id = Uuid::new_v4();
    let service = service(master_id, 30);
    let appointment = Appointment {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        master_id,
        service_id: service.id,
        service_option_id: None,
        start_time: at(1, 10, 0),
        end_time: at(1, 10, 30),
        status: AppointmentStatus::Pending,
        notes: "first visit".to_string(),
        created_at: at(1, 0, 0),
        updated_at: at(1, 0, 0),
        deleted_at: None,
    };
    let details = AppointmentDetails {
        appointment: appointment.clone(),
        service: Some(service.summary()),
        service_option: None,
    };

    let value = to_value(&details).expect("Failed to serialize details");

    assert_eq!(value["id"], json!(appointment.id));
    assert_eq!(value["status"], json!("pending"));
    assert_eq!(value["start_time"], json!("2024-01-01T10:00:00Z"));
    assert_eq!(value["service"]["name"], json!(service.name));
    assert!(value.get("deleted_at").is_none());

    let roundtrip: AppointmentDetails =
        serde_json::from_value(value).expect("Failed to deserialize details");
    assert_eq!(roundtrip, details);
}

#[test]
fn test_create_request_allows_missing_option_and_notes() {
    let master_id = Uuid::new_v4();
    let service_id = Uuid::new_v4();
    let body = format!(
        r#"{{"master_id":"{}","service_id":"{}","start_time":"2024-01-01T10:00:00Z"}}"#,
        master_id, service_id
    );

    let request: CreateAppointmentRequest = from_str(&body).expect("Failed to parse request");

    assert_eq!(request.master_id, master_id);
    assert_eq!(request.service_option_id, None);
    assert_eq!(request.notes, None);
}

#[test]
fn test_booking_duration_prefers_option() {
    let (service, option) = with_option(service(Uuid::new_v4(), 30), 45);

    assert_eq!(
        service.booking_duration(Some(option.id)).unwrap(),
        Duration::minutes(45)
    );
    assert!(matches!(
        service.booking_duration(None),
        Err(BookingError::Validation(_))
    ));
    assert!(matches!(
        service.booking_duration(Some(Uuid::new_v4())),
        Err(BookingError::NotFound(_))
    ));
}

#[test]
fn test_booking_duration_rejects_zero_length_service() {
    let plain = service(Uuid::new_v4(), 30);
    assert_eq!(plain.booking_duration(None).unwrap(), Duration::minutes(30));

    let degenerate = service(Uuid::new_v4(), 0);
    assert!(matches!(
        degenerate.booking_duration(None),
        Err(BookingError::Validation(_))
    ));
    assert_eq!(degenerate.window_duration(None).unwrap(), Duration::zero());
}

#[rstest]
#[case("2024-01-01T10:00:00Z")]
#[case("2024-01-01T12:00:00+02:00")]
#[case("2024-01-01T10:00:00")]
#[case("2024-01-01 10:00:00")]
fn test_parse_instant_accepts_supported_formats(#[case] input: &str) {
    assert_eq!(parse_instant(input).unwrap(), at(1, 10, 0));
}

#[rstest]
#[case("yesterday")]
#[case("2024-01-01")]
#[case("10:00")]
#[case("")]
fn test_parse_instant_rejects_malformed_input(#[case] input: &str) {
    assert!(matches!(
        parse_instant(input),
        Err(BookingError::Validation(_))
    ));
}

#[test]
fn test_bare_date_bounds_cover_whole_day() {
    assert_eq!(
        parse_range_bound("2024-01-01", RangeBound::Start).unwrap(),
        at(1, 0, 0)
    );
    assert_eq!(
        parse_range_bound("2024-01-01", RangeBound::End).unwrap(),
        at(2, 0, 0)
    );
    assert_eq!(
        parse_range_bound("2024-01-01T10:00:00Z", RangeBound::End).unwrap(),
        at(1, 10, 0)
    );
}

#[test]
fn test_caller_scope_follows_role() {
    let id = Uuid::new_v4();

    let master = Caller { id, role: Role::Master };
    assert_eq!(master.scope(), CallerScope::Master(id));
    assert!(master.scope().manages(id));
    assert!(!master.scope().manages(Uuid::new_v4()));

    let client = Caller { id, role: Role::User };
    assert!(!client.scope().manages(id));

    assert!(CallerScope::Admin.manages(Uuid::new_v4()));
    assert_eq!("MASTER".parse::<Role>().unwrap(), Role::Master);
    assert!(matches!(
        "owner".parse::<Role>(),
        Err(BookingError::Authentication(_))
    ));
}

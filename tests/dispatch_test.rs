mod common;

use chrono::NaiveDate;
use serde_json::json;

use common::{FakeExamApi, planning};
use examtrack::documents::DocumentContext;
use examtrack::documents::pv::{generate_pv, pv_document, pv_file_name};
use examtrack::models::{SurveillantWithDetails, Teacher};
use examtrack::services::check_all;
use examtrack::services::dispatch::{
    PV_MIN_ROWS, academic_year, build_convocations, build_pv, format_exam_date,
    send_all_convocations, send_convocation_for,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn supervisor(code: &str, nom: &str, email: &str, lead: bool) -> SurveillantWithDetails {
    SurveillantWithDetails {
        id_surveillance: None,
        est_charge_cours: u8::from(lead),
        code_enseignant: code.to_string(),
        enseignant: Some(Teacher {
            code: code.to_string(),
            nom: nom.to_string(),
            prenom: "A.".to_string(),
            email1: email.to_string(),
            ..Teacher::default()
        }),
    }
}

#[test]
fn academic_year_turns_over_in_september() {
    assert_eq!(academic_year(date(2025, 1, 20)), "2024/2025");
    assert_eq!(academic_year(date(2024, 9, 1)), "2024/2025");
    assert_eq!(academic_year(date(2024, 8, 31)), "2023/2024");
}

#[test]
fn exam_dates_are_shown_day_first() {
    assert_eq!(format_exam_date("2025-01-12"), "12/01/2025");
    assert_eq!(format_exam_date("12 janvier"), "12 janvier");
}

#[test]
fn pv_names_lead_and_pads_rows() {
    let roster = vec![
        supervisor("T02", "Haddad", "h@univ.dz", false),
        supervisor("T01", "Benali", "b@univ.dz", true),
    ];
    let pv = build_pv(&planning(4, "L1"), &roster, date(2025, 1, 10));

    assert_eq!(pv.nom_enseignant, "A. Benali");
    assert_eq!(pv.session, "Normale");
    assert_eq!(pv.annee_universitaire, "2024/2025");
    assert_eq!(pv.date_document, "10/01/2025");
    assert_eq!(pv.date_exam, "12/01/2025");
    assert_eq!(pv.module_nom, "Algorithmique");
    assert_eq!(pv.surveillants[1].nom, "A. Benali (Responsable)");
    assert_eq!(pv.padded_rows().len(), PV_MIN_ROWS);
    assert_eq!(pv.surveillants_rows.matches("<tr>").count(), PV_MIN_ROWS);

    let doc = pv_document(&pv, &DocumentContext::new("Faculty", date(2025, 1, 10)));
    assert_eq!(doc.rows.len(), PV_MIN_ROWS);
    assert_eq!(doc.rows[0][0], "A. Haddad");
}

#[test]
fn pv_without_session_defaults_to_normal_session() {
    let mut exam = planning(4, "L1");
    exam.session.clear();
    let pv = build_pv(&exam, &[], date(2025, 1, 10));
    assert_eq!(pv.session, "Session Normale");
    assert_eq!(pv.nom_enseignant, "");
}

#[test]
fn pv_pdf_is_named_after_the_planning() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let pv = build_pv(&planning(8, "L1"), &[], date(2025, 1, 10));
    let path = generate_pv(&pv, &DocumentContext::new("Faculty", date(2025, 1, 10)), dir.path())
        .expect("Failed to write PV");
    assert_eq!(path, dir.path().join(pv_file_name(8)));
    assert!(path.exists());
}

#[test]
fn convocations_group_exams_per_email() {
    let rosters = vec![
        (
            planning(1, "L1"),
            vec![
                supervisor("T01", "Benali", "b@univ.dz", true),
                supervisor("T02", "Haddad", "h@univ.dz", false),
            ],
        ),
        (
            planning(2, "L2"),
            vec![
                supervisor("T01", "Benali", "b@univ.dz", false),
                supervisor("T03", "Nomail", "", false),
            ],
        ),
    ];

    let convocations = build_convocations(&rosters);

    assert_eq!(convocations.len(), 2);
    assert_eq!(convocations[0].email, "b@univ.dz");
    assert_eq!(convocations[0].examens.len(), 2);
    assert_eq!(convocations[1].nom_enseignant, "A. Haddad");
    assert_eq!(
        serde_json::to_value(&convocations[1].examens[0]).expect("serializable"),
        json!({
            "date": "12/01/2025",
            "horaire": "08:30",
            "module": "Algorithmique, Analyse 1",
            "local": "Amphi A"
        })
    );
}

#[tokio::test]
async fn all_convocations_go_out_in_one_bulk_call() {
    let exams = FakeExamApi::default();
    exams.rosters.lock().unwrap().insert(
        1,
        vec![supervisor("T01", "Benali", "b@univ.dz", true)],
    );

    send_all_convocations(&exams, vec![planning(1, "L1"), planning(2, "L2")])
        .await
        .expect("Failed to send");

    assert_eq!(
        exams.call_names(),
        vec![
            "surveillants_by_planning",
            "surveillants_by_planning",
            "send_bulk_convocations"
        ]
    );
    let sent = exams.sent.lock().unwrap().clone();
    assert_eq!(sent[0].as_array().map(Vec::len), Some(1));
    assert_eq!(sent[0][0]["email"], "b@univ.dz");
}

#[tokio::test]
async fn single_convocation_needs_a_reachable_teacher() {
    let exams = FakeExamApi::default();
    exams.rosters.lock().unwrap().insert(
        1,
        vec![supervisor("T01", "Benali", "b@univ.dz", true)],
    );

    let err = send_convocation_for(&exams, vec![planning(1, "L1")], "T09")
        .await
        .unwrap_err();
    assert!(err.is_client_side());

    send_convocation_for(&exams, vec![planning(1, "L1")], "T01")
        .await
        .expect("Failed to send");
    assert_eq!(exams.sent.lock().unwrap()[0]["nom_enseignant"], "A. Benali");
}

#[tokio::test]
async fn check_all_runs_every_check_in_order() {
    let exams = FakeExamApi::default();
    *exams.fail_schedule_check.lock().unwrap() = true;

    let report = check_all(&exams, Some(4)).await;

    assert_eq!(
        exams.call_names(),
        vec![
            "check_exam_date",
            "check_teacher_schedule_conflict",
            "check_surveillance_workload"
        ]
    );
    assert!(report.has_failures());
    assert!(report.workload.is_ok());
    assert_eq!(report.conflict_count(), 1);
}

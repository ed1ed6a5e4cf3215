use chrono::Duration;

use revise_core::model::{ProfileDraft, UserId, parse_time_of_day};
use revise_core::time::{fixed_clock, fixed_today};
use services::{AgendaEntry, AppServices, PlanSessionInput, SubjectInput};

#[tokio::test]
async fn planner_flow_feeds_the_progress_surfaces() {
    let app = AppServices::in_memory(fixed_clock());
    let user = UserId::generate();
    let today = fixed_today();

    app.profile()
        .update_profile(
            user,
            ProfileDraft {
                first_name: Some("Marie".into()),
                weekly_goal_hours: Some(12.0),
                ..ProfileDraft::new()
            },
        )
        .await
        .unwrap();

    let maths = app
        .subjects()
        .create_subject(
            user,
            SubjectInput {
                name: "Mathématiques".into(),
                color: "#3b82f6".into(),
                exam_date: Some(today + Duration::days(20)),
                target_hours: Some(10.0),
                ..SubjectInput::default()
            },
        )
        .await
        .unwrap();

    // One 1.5h session per evening over the last three days, all done,
    // plus one planned for tonight.
    let mut planned_today = None;
    for back in 0..=3 {
        let id = app
            .sessions()
            .plan_session(
                user,
                PlanSessionInput {
                    subject_id: Some(maths),
                    date: today - Duration::days(back),
                    start: parse_time_of_day("18:00").unwrap(),
                    end: parse_time_of_day("19:30").unwrap(),
                    notes: None,
                },
            )
            .await
            .unwrap();
        if back == 0 {
            planned_today = Some(id);
        } else {
            app.sessions().mark_done(user, id).await.unwrap();
        }
    }

    let overview = app.progress().progression(user).await.unwrap();

    // Today's session is still planned, so the streak leans on the three
    // completed evenings.
    assert_eq!(overview.streak_days, 3);

    // fixed_today() is a Friday: all three done sessions fall in the
    // current ISO week.
    assert!((overview.weekly.done_hours - 4.5).abs() < 1e-9);
    assert_eq!(overview.weekly.goal_hours, Some(12.0));
    assert!((overview.weekly.percent.unwrap() - 37.5).abs() < 1e-9);

    let maths_item = &overview.subjects[0];
    assert!((maths_item.hours.done - 4.5).abs() < 1e-9);
    assert!((maths_item.hours.planned - 6.0).abs() < 1e-9);
    assert!((maths_item.target_percent.unwrap() - 45.0).abs() < 1e-9);
    assert_eq!(maths_item.days_until_exam, Some(20));

    // The day agenda shows tonight's pending session with its subject.
    let agenda = app.agenda().day_agenda(user, today).await.unwrap();
    assert_eq!(agenda.len(), 1);
    match &agenda[0] {
        AgendaEntry::Session { session, subject } => {
            assert_eq!(Some(session.id()), planned_today);
            assert_eq!(subject.as_ref().unwrap().name(), "Mathématiques");
        }
        AgendaEntry::Event(_) => panic!("expected a session entry"),
    }

    // Completing tonight's session extends both the streak and the week.
    app.sessions()
        .mark_done(user, planned_today.unwrap())
        .await
        .unwrap();
    let after = app.progress().progression(user).await.unwrap();
    assert_eq!(after.streak_days, 4);
    assert!((after.weekly.done_hours - 6.0).abs() < 1e-9);
}

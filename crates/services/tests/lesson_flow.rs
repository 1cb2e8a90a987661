use chrono::Duration;
use services::{AppServices, Clock, LessonDraft};
use storage::repository::Storage;
use tutor_core::model::{Exercise, ExerciseKind, Section, Subject, UserId};
use tutor_core::narration::{NarrationStatus, VoiceSettings};
use tutor_core::time::fixed_now;

fn draft(title: &str) -> LessonDraft {
    LessonDraft {
        title: title.to_owned(),
        description: "Découvrir les planètes".to_owned(),
        subject: Subject::Science,
        level: "CE2".to_owned(),
        duration_minutes: 15,
        content: vec![
            Section::new("Le Soleil", "Le Soleil est une étoile."),
            Section::new("La Terre", "La Terre tourne autour du Soleil."),
        ],
        exercises: vec![
            Exercise::new(
                "Le Soleil est une étoile.",
                ExerciseKind::TrueFalse,
                vec![],
                "true",
                "",
                5,
            )
            .unwrap(),
        ],
        is_published: false,
    }
}

#[tokio::test]
async fn tutor_publishes_and_student_completes() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()), None);
    let tutor = UserId::random();
    let student = UserId::random();

    let id = services
        .lessons()
        .create_lesson(tutor, draft("Le système solaire"))
        .await
        .unwrap();

    let catalog = services.catalog();
    assert!(catalog.list_subject(student, Subject::Science).await.unwrap().is_empty());

    assert!(services.lessons().toggle_publish(id).await.unwrap());
    let listed = catalog.list_subject(student, Subject::Science).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].exercise_count, 1);
    assert!(!listed[0].is_completed);

    let quiz = services.quiz_loop();
    let mut session = quiz.start_quiz(id).await.unwrap();
    session.record_answer(0, "True").unwrap();
    let submission = quiz.submit(student, &mut session).unwrap();
    assert_eq!(submission.outcome.percentage(), 100);
    submission.write.wait().await;

    catalog.mark_completed(student, id).await.unwrap();
    let listed = catalog.list_subject(student, Subject::Science).await.unwrap();
    assert!(listed[0].is_completed);

    services.lessons().delete_lesson(id).await.unwrap();
    assert!(quiz.attempt_history(student, id, 10).await.unwrap().is_empty());
    assert!(catalog.list_subject(student, Subject::Science).await.unwrap().is_empty());
}

#[tokio::test]
async fn tutor_listing_is_newest_first() {
    let storage = Storage::in_memory();
    let tutor = UserId::random();
    let earlier = Clock::fixed(fixed_now());
    let mut later = earlier;
    later.advance(Duration::minutes(5));

    let morning = AppServices::from_storage(&storage, VoiceSettings::default(), earlier, None);
    let evening = AppServices::from_storage(&storage, VoiceSettings::default(), later, None);

    let older = morning.lessons().create_lesson(tutor, draft("Ancienne")).await.unwrap();
    let newer = evening.lessons().create_lesson(tutor, draft("Nouvelle")).await.unwrap();
    morning
        .lessons()
        .create_lesson(UserId::random(), draft("Autre tuteur"))
        .await
        .unwrap();

    let listed = morning.lessons().list_for_tutor(tutor).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|l| l.id()).collect();
    assert_eq!(ids, vec![newer, older]);

    let saved = evening.lessons().save_lesson(older, draft("Ancienne v2")).await.unwrap();
    assert_eq!(saved.created_at(), fixed_now());
    assert_eq!(saved.tutor_id(), tutor);
}

#[test]
fn narration_is_a_no_op_without_engine() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()), None);
    let mut ctl = services.narration_controller();
    ctl.speak("Le Soleil est une étoile.");
    ctl.toggle("Le Soleil est une étoile.");
    assert_eq!(ctl.status(), NarrationStatus::Idle);
}

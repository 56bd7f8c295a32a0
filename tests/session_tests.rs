use mindmate::gemini::CompletionError;
use mindmate::scope;
use mindmate::session::{Origin, Session, TurnPlan, FALLBACK_MESSAGE, REFUSAL_MESSAGE};

#[test]
fn out_of_scope_submission_yields_fixed_refusal() {
    let mut session = Session::new();
    let plan = session.begin_turn("What's a fair price for a used laptop?");

    assert_eq!(plan, Some(TurnPlan::Refused));
    assert!(!session.is_pending());

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].origin, Origin::User);
    assert_eq!(messages[1].origin, Origin::Assistant);
    assert_eq!(messages[1].text, REFUSAL_MESSAGE);
}

#[test]
fn refusal_is_identical_regardless_of_input() {
    let inputs = [
        "what is the price of eggs",
        "should I buy bitcoin right now?",
        "BEST STOCK TIPS and also I feel sad",
    ];
    for input in inputs {
        let mut session = Session::new();
        let _ = session.begin_turn(input);
        assert_eq!(session.last_assistant_text(), Some(REFUSAL_MESSAGE));
    }
}

#[test]
fn accepted_submission_forwards_prompt_with_user_text() {
    let mut session = Session::new();
    let plan = session.begin_turn("I've been feeling anxious lately");

    let Some(TurnPlan::Forward(request)) = plan else {
        panic!("expected the message to be forwarded");
    };
    assert!(session.is_pending());
    assert_eq!(session.messages().len(), 1);
    assert!(request.render().contains("I've been feeling anxious lately"));
}

#[test]
fn successful_turn_stores_reply_verbatim() {
    let mut session = Session::new();
    let _ = session.begin_turn("I've been feeling anxious lately");
    session.resolve_turn(Ok("<p>I hear you...</p>".to_string()));

    assert!(!session.is_pending());
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].origin, Origin::Assistant);
    assert_eq!(messages[1].text, "<p>I hear you...</p>");
}

#[test]
fn failed_turn_substitutes_fixed_fallback() {
    let mut session = Session::new();
    let _ = session.begin_turn("my week has been rough");
    session.resolve_turn(Err(CompletionError::MalformedResponse(
        "no candidate text in response".to_string(),
    )));

    assert!(!session.is_pending());
    assert_eq!(session.last_assistant_text(), Some(FALLBACK_MESSAGE));
}

#[test]
fn every_turn_grows_messages_by_exactly_two() {
    let mut session = Session::new();

    // success, failure, refusal: one user + one assistant message each
    let _ = session.begin_turn("feeling okay today");
    session.resolve_turn(Ok("<p>Glad to hear it! 😊</p>".to_string()));
    assert_eq!(session.messages().len(), 2);

    let _ = session.begin_turn("still a bit tired though");
    session.resolve_turn(Err(CompletionError::Aborted("task dropped".to_string())));
    assert_eq!(session.messages().len(), 4);

    let _ = session.begin_turn("how much does therapy cost");
    assert_eq!(session.messages().len(), 6);

    let origins: Vec<Origin> = session.messages().iter().map(|m| m.origin).collect();
    assert_eq!(
        origins,
        vec![
            Origin::User,
            Origin::Assistant,
            Origin::User,
            Origin::Assistant,
            Origin::User,
            Origin::Assistant,
        ]
    );
}

#[test]
fn whitespace_only_submission_is_ignored() {
    let mut session = Session::new();
    assert_eq!(session.begin_turn("   \t  "), None);
    assert!(session.messages().is_empty());
    assert!(!session.is_pending());
}

#[test]
fn submission_text_is_trimmed() {
    let mut session = Session::new();
    let _ = session.begin_turn("  I feel lonely  ");
    assert_eq!(session.messages()[0].text, "I feel lonely");
}

#[test]
fn pending_tracks_turn_lifecycle() {
    let mut session = Session::new();
    assert!(!session.is_pending());

    let _ = session.begin_turn("I can't sleep at night");
    assert!(session.is_pending());

    session.resolve_turn(Ok("<p>That sounds exhausting. 😔</p>".to_string()));
    assert!(!session.is_pending());
}

#[test]
fn filter_agrees_with_session_refusals() {
    assert!(!scope::is_in_scope("What's a fair price for a used laptop?"));
    assert!(scope::is_in_scope("I've been feeling anxious lately"));
}

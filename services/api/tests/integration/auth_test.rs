use yamdb_api::domain::types::PendingSignup;
use yamdb_api::error::ApiError;
use yamdb_api::usecase::auth::{CreateTokenUseCase, SignupInput, SignupUseCase, TokenInput};
use yamdb_auth_types::token::validate_access_token;
use yamdb_domain::role::Role;
use yamdb_testing::auth::TEST_JWT_SECRET;

use crate::helpers::{MockMailer, MockSignupRepo, MockUserRepo, test_user};

fn signup_input(username: &str, email: &str) -> SignupInput {
    SignupInput {
        email: email.to_owned(),
        username: username.to_owned(),
    }
}

// ── SignupUseCase ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_new_user_and_mail_code() {
    let users = MockUserRepo::empty();
    let signups = MockSignupRepo::new(&users, vec![]);
    let mailer = MockMailer::new();
    let users_handle = users.users_handle();
    let pending_handle = signups.pending_handle();
    let sent = mailer.sent_handle();

    let usecase = SignupUseCase {
        users,
        signups,
        mailer,
    };
    let input = signup_input("newbie", "newbie@yamdb.fake");
    let echo = usecase.execute(input.clone()).await.unwrap();

    assert_eq!(echo, input);
    let users = users_handle.lock().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role, Role::User);

    let pending = pending_handle.lock().unwrap();
    assert_eq!(pending[0].code, PendingSignup::code_for("newbie"));

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "newbie@yamdb.fake");
    assert!(sent[0].body.contains(&pending[0].code));
}

#[tokio::test]
async fn should_resend_code_for_existing_user_with_same_email() {
    let user = test_user(7, Role::User);
    let users = MockUserRepo::new(vec![user.clone()]);
    let signups = MockSignupRepo::new(&users, vec![]);
    let mailer = MockMailer::new();
    let pending_handle = signups.pending_handle();
    let sent = mailer.sent_handle();

    let usecase = SignupUseCase {
        users,
        signups,
        mailer,
    };
    usecase
        .execute(signup_input(&user.username, &user.email))
        .await
        .unwrap();

    let pending = pending_handle.lock().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, 7);
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_taken_username_with_other_email() {
    let user = test_user(7, Role::User);
    let users = MockUserRepo::new(vec![user.clone()]);
    let signups = MockSignupRepo::new(&users, vec![]);

    let usecase = SignupUseCase {
        users,
        signups,
        mailer: MockMailer::new(),
    };
    let result = usecase
        .execute(signup_input(&user.username, "other@yamdb.fake"))
        .await;

    match result {
        Err(ApiError::Validation(errors)) => {
            assert!(errors.get("username").is_some());
            assert!(errors.get("email").is_none());
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn should_reject_reserved_username() {
    let users = MockUserRepo::empty();
    let signups = MockSignupRepo::new(&users, vec![]);
    let usecase = SignupUseCase {
        users,
        signups,
        mailer: MockMailer::new(),
    };

    let result = usecase.execute(signup_input("me", "me@yamdb.fake")).await;
    assert!(
        matches!(result, Err(ApiError::Validation(_))),
        "expected Validation, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let users = MockUserRepo::empty();
    let signups = MockSignupRepo::new(&users, vec![]);
    let usecase = SignupUseCase {
        users,
        signups,
        mailer: MockMailer::new(),
    };

    let result = usecase.execute(signup_input("someone", "not-an-email")).await;
    match result {
        Err(ApiError::Validation(errors)) => assert!(errors.get("email").is_some()),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn should_report_mail_failure_after_storing_code() {
    let users = MockUserRepo::empty();
    let signups = MockSignupRepo::new(&users, vec![]);
    let pending_handle = signups.pending_handle();
    let usecase = SignupUseCase {
        users,
        signups,
        mailer: MockMailer::failing(),
    };

    let result = usecase
        .execute(signup_input("newbie", "newbie@yamdb.fake"))
        .await;
    assert!(
        matches!(result, Err(ApiError::MailDelivery(_))),
        "expected MailDelivery, got {result:?}"
    );
    assert_eq!(pending_handle.lock().unwrap().len(), 1);
}

// ── CreateTokenUseCase ───────────────────────────────────────────────────────

fn token_usecase(
    users: MockUserRepo,
    signups: MockSignupRepo,
) -> CreateTokenUseCase<MockUserRepo, MockSignupRepo> {
    CreateTokenUseCase {
        users,
        signups,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        ttl_secs: 3600,
    }
}

#[tokio::test]
async fn should_issue_token_for_matching_code() {
    let user = test_user(3, Role::Moderator);
    let pending = PendingSignup::issue(&user, chrono::Utc::now());
    let users = MockUserRepo::new(vec![user.clone()]);
    let signups = MockSignupRepo::new(&users, vec![pending.clone()]);

    let output = token_usecase(users, signups)
        .execute(TokenInput {
            username: user.username.clone(),
            confirmation_code: pending.code,
        })
        .await
        .unwrap();

    let info = validate_access_token(&output.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, 3);
    assert_eq!(info.role, Role::Moderator);
}

#[tokio::test]
async fn should_reject_wrong_code() {
    let user = test_user(3, Role::User);
    let pending = PendingSignup::issue(&user, chrono::Utc::now());
    let users = MockUserRepo::new(vec![user.clone()]);
    let signups = MockSignupRepo::new(&users, vec![pending]);

    let result = token_usecase(users, signups)
        .execute(TokenInput {
            username: user.username.clone(),
            confirmation_code: "0000".to_owned(),
        })
        .await;
    assert!(
        matches!(result, Err(ApiError::InvalidConfirmationCode)),
        "expected InvalidConfirmationCode, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_user_without_pending_code() {
    let user = test_user(3, Role::User);
    let users = MockUserRepo::new(vec![user.clone()]);
    let signups = MockSignupRepo::new(&users, vec![]);

    let result = token_usecase(users, signups)
        .execute(TokenInput {
            username: user.username.clone(),
            confirmation_code: PendingSignup::code_for(&user.username),
        })
        .await;
    assert!(
        matches!(result, Err(ApiError::InvalidConfirmationCode)),
        "expected InvalidConfirmationCode, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_username() {
    let users = MockUserRepo::empty();
    let signups = MockSignupRepo::new(&users, vec![]);

    let result = token_usecase(users, signups)
        .execute(TokenInput {
            username: "ghost".to_owned(),
            confirmation_code: "whatever".to_owned(),
        })
        .await;
    assert!(
        matches!(result, Err(ApiError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}

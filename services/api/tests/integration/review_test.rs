use yamdb_api::error::ApiError;
use yamdb_api::usecase::review::{
    CreateReviewUseCase, DeleteReviewUseCase, ListReviewsUseCase, ReviewInput, ReviewPatch,
    UpdateReviewUseCase,
};
use yamdb_domain::pagination::PageRequest;
use yamdb_domain::role::Role;

use crate::helpers::{MockReviewRepo, MockTitleRepo, test_actor, test_review, test_title};

fn input(score: i16) -> ReviewInput {
    ReviewInput {
        text: "Loved it".to_owned(),
        score,
    }
}

#[tokio::test]
async fn should_create_review_and_update_rating() {
    let reviews = MockReviewRepo::new(vec![test_review(1, 1, 2, 4)]);
    let handle = reviews.reviews_handle();
    let usecase = CreateReviewUseCase {
        titles: MockTitleRepo::new(vec![test_title(1)]),
        reviews,
    };

    let author = test_actor(3, Role::User);
    let review = usecase.execute(Some(&author), 1, input(9)).await.unwrap();
    assert_eq!(review.author_id, 3);
    assert_eq!(review.score, 9);

    let rating_source = MockReviewRepo {
        reviews: handle,
    };
    assert_eq!(rating_source.rating(1), Some(6.5));
}

#[tokio::test]
async fn should_reject_second_review_by_same_author() {
    let usecase = CreateReviewUseCase {
        titles: MockTitleRepo::new(vec![test_title(1)]),
        reviews: MockReviewRepo::new(vec![test_review(1, 1, 3, 7)]),
    };

    let author = test_actor(3, Role::User);
    let result = usecase.execute(Some(&author), 1, input(5)).await;
    match result {
        Err(ApiError::Validation(errors)) => {
            assert!(errors.get("non_field_errors").is_some());
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn should_reject_score_out_of_range() {
    let usecase = CreateReviewUseCase {
        titles: MockTitleRepo::new(vec![test_title(1)]),
        reviews: MockReviewRepo::empty(),
    };

    let author = test_actor(3, Role::User);
    for score in [0, 11] {
        let result = usecase.execute(Some(&author), 1, input(score)).await;
        match result {
            Err(ApiError::Validation(errors)) => assert!(errors.get("score").is_some()),
            other => panic!("expected Validation for {score}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn should_return_not_found_for_review_on_missing_title() {
    let usecase = CreateReviewUseCase {
        titles: MockTitleRepo::empty(),
        reviews: MockReviewRepo::empty(),
    };

    let author = test_actor(3, Role::User);
    let result = usecase.execute(Some(&author), 1, input(5)).await;
    assert!(
        matches!(result, Err(ApiError::TitleNotFound)),
        "expected TitleNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_authentication_to_review() {
    let usecase = CreateReviewUseCase {
        titles: MockTitleRepo::new(vec![test_title(1)]),
        reviews: MockReviewRepo::empty(),
    };

    let result = usecase.execute(None, 1, input(5)).await;
    assert!(
        matches!(result, Err(ApiError::Unauthenticated)),
        "expected Unauthenticated, got {result:?}"
    );
}

#[tokio::test]
async fn should_list_reviews_newest_first() {
    let usecase = ListReviewsUseCase {
        titles: MockTitleRepo::new(vec![test_title(1)]),
        reviews: MockReviewRepo::new(vec![
            test_review(1, 1, 2, 5),
            test_review(2, 1, 3, 6),
            test_review(3, 2, 3, 6),
        ]),
    };

    let reviews = usecase.execute(1, PageRequest::default()).await.unwrap();
    let ids: Vec<i32> = reviews.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn should_let_author_and_moderator_edit_but_not_others() {
    let usecase = UpdateReviewUseCase {
        titles: MockTitleRepo::new(vec![test_title(1)]),
        reviews: MockReviewRepo::new(vec![test_review(1, 1, 2, 5)]),
    };
    let patch = |score| ReviewPatch {
        text: None,
        score: Some(score),
    };

    let stranger = test_actor(9, Role::User);
    let result = usecase.execute(Some(&stranger), 1, 1, patch(1)).await;
    assert!(
        matches!(result, Err(ApiError::PermissionDenied)),
        "expected PermissionDenied, got {result:?}"
    );

    let author = test_actor(2, Role::User);
    let review = usecase.execute(Some(&author), 1, 1, patch(8)).await.unwrap();
    assert_eq!(review.score, 8);
    assert_eq!(review.text, "review 1");

    let moderator = test_actor(4, Role::Moderator);
    let review = usecase
        .execute(Some(&moderator), 1, 1, patch(3))
        .await
        .unwrap();
    assert_eq!(review.score, 3);
}

#[tokio::test]
async fn should_not_find_review_under_another_title() {
    let usecase = DeleteReviewUseCase {
        titles: MockTitleRepo::new(vec![test_title(1), test_title(2)]),
        reviews: MockReviewRepo::new(vec![test_review(1, 1, 2, 5)]),
    };

    let author = test_actor(2, Role::User);
    let result = usecase.execute(Some(&author), 2, 1).await;
    assert!(
        matches!(result, Err(ApiError::ReviewNotFound)),
        "expected ReviewNotFound, got {result:?}"
    );

    usecase.execute(Some(&author), 1, 1).await.unwrap();
}

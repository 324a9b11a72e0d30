use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::PendingReminderDTO;
use reelminder_api_structs::get_pending_reminders::APIResponse;
use reelminder_domain::{EmailUserRecord, RequestRecord};
use reelminder_infra::ReelminderContext;
use std::collections::HashMap;

pub async fn get_pending_reminders_controller(
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = GetPendingRemindersUseCase {};

    execute(usecase, &ctx)
        .await
        .map(|res| {
            let reminders = res
                .requests
                .into_iter()
                .map(|request| {
                    let user = request
                        .normalized_email()
                        .and_then(|email| res.users.get(&email));
                    PendingReminderDTO::new(request, user, res.now)
                })
                .collect();
            HttpResponse::Ok().json(APIResponse { reminders })
        })
        .map_err(ReelminderError::from)
}

/// Snapshot of the reminders a run would consider: overdue, titled and
/// unresolved requests whose recipient is subscribed, newest first
#[derive(Debug)]
struct GetPendingRemindersUseCase {}

#[derive(Debug)]
struct UseCaseResponse {
    requests: Vec<RequestRecord>,
    users: HashMap<String, EmailUserRecord>,
    now: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug)]
enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetPendingRemindersUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "GetPendingReminders";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();
        let grace = ctx.config.grace_period();
        let users = ctx
            .email_users
            .list_all()
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .into_iter()
            .map(|user| (user.email.clone(), user))
            .collect::<HashMap<_, _>>();

        let mut requests = ctx
            .repos
            .requests
            .find_unresolved()
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .into_iter()
            .filter(|request| request.is_reminder_candidate(now, grace))
            .filter(|request| {
                request
                    .normalized_email()
                    .and_then(|email| users.get(&email))
                    .map(|user| !user.is_unsubscribed())
                    .unwrap_or(true)
            })
            .collect::<Vec<_>>();
        requests.sort_by(|a, b| b.media_added_at.cmp(&a.media_added_at));

        Ok(UseCaseResponse {
            requests,
            users,
            now,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{setup, stored_request, TestContext};
    use chrono::Duration;
    use reelminder_infra::ISys;
    use reelminder_domain::UNKNOWN_TITLE;

    #[actix_web::main]
    #[test]
    async fn lists_overdue_titled_requests_of_subscribed_users() {
        let TestContext { ctx, sys, .. } = setup();
        let older = stored_request(1, "a@x.com", "a");
        let newer = stored_request(2, "A@x.com", "a");
        let mut untitled = stored_request(3, "a@x.com", "a");
        untitled.title = UNKNOWN_TITLE.into();
        let mut recent = stored_request(4, "a@x.com", "a");
        recent.media_added_at = sys.now() - Duration::days(1);
        let unsubscribed = stored_request(5, "b@x.com", "b");
        for request in [&older, &newer, &untitled, &recent, &unsubscribed] {
            ctx.repos.requests.insert(request).await.unwrap();
        }
        ctx.email_users
            .record_send("a@x.com", sys.now(), Duration::hours(24))
            .await
            .unwrap();
        ctx.email_users.unsubscribe("b@x.com", sys.now()).await.unwrap();

        let res = GetPendingRemindersUseCase {}.execute(&ctx).await.unwrap();
        let ids = res.requests.iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(
            res.users.get("a@x.com").and_then(|u| u.cooldown_until(res.now)),
            Some(sys.now() + Duration::hours(24))
        );
    }
}

//! Repository tests against a real database.

use courier_core::types::DbId;
use courier_db::models::preference::UpsertOutcome;
use courier_db::repositories::{
    ChannelRepo, DeliveryRecordRepo, IdentityRepo, NotificationRepo, PreferenceRepo,
};
use courier_db::DbPool;

async fn seed_user(pool: &DbPool, username: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO users (username, email) VALUES ($1, $2) RETURNING id")
        .bind(username)
        .bind(format!("{username}@example.com"))
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn seed_group(pool: &DbPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO groups (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn add_member(pool: &DbPool, user_id: DbId, group_id: DbId) {
    sqlx::query("INSERT INTO user_groups (user_id, group_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(group_id)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn channel_upsert_preserves_enabled_flag(pool: DbPool) {
    ChannelRepo::upsert_definition(&pool, "email", "Email", None)
        .await
        .unwrap();
    assert!(ChannelRepo::set_enabled(&pool, "email", false).await.unwrap());

    // A later upsert refreshes metadata without re-enabling the channel.
    let channel = ChannelRepo::upsert_definition(&pool, "email", "E-mail", Some("SMTP"))
        .await
        .unwrap();
    assert_eq!(channel.display_name, "E-mail");
    assert_eq!(channel.description.as_deref(), Some("SMTP"));
    assert!(!channel.enabled);
}

#[sqlx::test(migrations = "../../migrations")]
async fn channel_delete_guarded_by_references(pool: DbPool) {
    let channel = ChannelRepo::upsert_definition(&pool, "email", "Email", None)
        .await
        .unwrap();
    let user = seed_user(&pool, "alice").await;
    let notification = NotificationRepo::upsert(&pool, "digest", "Digest", true, true)
        .await
        .unwrap();

    PreferenceRepo::upsert_user(&pool, user, notification.id, channel.id, false)
        .await
        .unwrap();

    assert!(!ChannelRepo::delete_if_unreferenced(&pool, channel.id).await.unwrap());
    assert!(ChannelRepo::get_by_name(&pool, "email").await.unwrap().is_some());

    PreferenceRepo::clear_users(&pool, &[user]).await.unwrap();
    assert!(ChannelRepo::delete_if_unreferenced(&pool, channel.id).await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn channel_list_filters_disabled(pool: DbPool) {
    ChannelRepo::upsert_definition(&pool, "email", "Email", None)
        .await
        .unwrap();
    ChannelRepo::upsert_definition(&pool, "sms", "SMS", None)
        .await
        .unwrap();
    ChannelRepo::set_enabled(&pool, "sms", false).await.unwrap();

    let all = ChannelRepo::list(&pool, false).await.unwrap();
    assert_eq!(all.len(), 2);

    let enabled = ChannelRepo::list(&pool, true).await.unwrap();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].name, "email");
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn notification_upsert_is_keyed_by_name(pool: DbPool) {
    let first = NotificationRepo::upsert(&pool, "digest", "Digest", true, true)
        .await
        .unwrap();
    let second = NotificationRepo::upsert(&pool, "digest", "Weekly digest", false, false)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.display_name, "Weekly digest");
    assert!(!second.is_public);
    assert!(!second.default_notify);
}

#[sqlx::test(migrations = "../../migrations")]
async fn replace_channels_is_wholesale(pool: DbPool) {
    let email = ChannelRepo::upsert_definition(&pool, "email", "Email", None)
        .await
        .unwrap();
    let sms = ChannelRepo::upsert_definition(&pool, "sms", "SMS", None)
        .await
        .unwrap();
    let notification = NotificationRepo::upsert(&pool, "digest", "Digest", true, true)
        .await
        .unwrap();

    NotificationRepo::replace_channels(&pool, notification.id, &[email.id, sms.id])
        .await
        .unwrap();
    let channels = NotificationRepo::allowed_channels(&pool, notification.id, false)
        .await
        .unwrap();
    assert_eq!(channels.len(), 2);

    NotificationRepo::replace_channels(&pool, notification.id, &[sms.id])
        .await
        .unwrap();
    let channels = NotificationRepo::allowed_channels(&pool, notification.id, false)
        .await
        .unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].name, "sms");
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_reports_created_updated_unchanged(pool: DbPool) {
    let user = seed_user(&pool, "alice").await;
    let channel = ChannelRepo::upsert_definition(&pool, "email", "Email", None)
        .await
        .unwrap();
    let notification = NotificationRepo::upsert(&pool, "digest", "Digest", true, true)
        .await
        .unwrap();

    let outcome = PreferenceRepo::upsert_user(&pool, user, notification.id, channel.id, true)
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Created);

    let outcome = PreferenceRepo::upsert_user(&pool, user, notification.id, channel.id, true)
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Unchanged);

    let outcome = PreferenceRepo::upsert_user(&pool, user, notification.id, channel.id, false)
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);
}

#[sqlx::test(migrations = "../../migrations")]
async fn unchanged_upsert_does_not_touch_updated_at(pool: DbPool) {
    let user = seed_user(&pool, "alice").await;
    let channel = ChannelRepo::upsert_definition(&pool, "email", "Email", None)
        .await
        .unwrap();
    let notification = NotificationRepo::upsert(&pool, "digest", "Digest", true, true)
        .await
        .unwrap();

    PreferenceRepo::upsert_user(&pool, user, notification.id, channel.id, true)
        .await
        .unwrap();
    let before = PreferenceRepo::user_prefs_for(&pool, user, notification.id)
        .await
        .unwrap()[0]
        .updated_at;

    PreferenceRepo::upsert_user(&pool, user, notification.id, channel.id, true)
        .await
        .unwrap();
    let after = PreferenceRepo::user_prefs_for(&pool, user, notification.id)
        .await
        .unwrap()[0]
        .updated_at;

    assert_eq!(before, after);
}

#[sqlx::test(migrations = "../../migrations")]
async fn group_prefs_fetch_spans_multiple_groups(pool: DbPool) {
    let user = seed_user(&pool, "alice").await;
    let staff = seed_group(&pool, "staff").await;
    let oncall = seed_group(&pool, "oncall").await;
    add_member(&pool, user, staff).await;
    add_member(&pool, user, oncall).await;

    let channel = ChannelRepo::upsert_definition(&pool, "email", "Email", None)
        .await
        .unwrap();
    let notification = NotificationRepo::upsert(&pool, "pages", "Pages", true, false)
        .await
        .unwrap();

    PreferenceRepo::upsert_group(&pool, staff, notification.id, channel.id, false)
        .await
        .unwrap();
    PreferenceRepo::upsert_group(&pool, oncall, notification.id, channel.id, true)
        .await
        .unwrap();

    let group_ids = IdentityRepo::group_ids_for_user(&pool, user).await.unwrap();
    assert_eq!(group_ids.len(), 2);

    let prefs = PreferenceRepo::group_prefs_for(&pool, &group_ids, notification.id)
        .await
        .unwrap();
    assert_eq!(prefs.len(), 2);
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn permission_check_covers_direct_and_group_grants(pool: DbPool) {
    let user = seed_user(&pool, "alice").await;
    let group = seed_group(&pool, "staff").await;
    add_member(&pool, user, group).await;

    let view: DbId = sqlx::query_scalar("INSERT INTO permissions (name) VALUES ('billing.view') RETURNING id")
        .fetch_one(&pool)
        .await
        .unwrap();
    let edit: DbId = sqlx::query_scalar("INSERT INTO permissions (name) VALUES ('billing.edit') RETURNING id")
        .fetch_one(&pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO user_permissions (user_id, permission_id) VALUES ($1, $2)")
        .bind(user)
        .bind(view)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO group_permissions (group_id, permission_id) VALUES ($1, $2)")
        .bind(group)
        .bind(edit)
        .execute(&pool)
        .await
        .unwrap();

    let names = vec!["billing.view".to_string(), "billing.edit".to_string()];
    assert!(IdentityRepo::has_all_permissions(&pool, user, &names).await.unwrap());

    let missing = vec!["billing.admin".to_string()];
    assert!(!IdentityRepo::has_all_permissions(&pool, user, &missing).await.unwrap());

    // Empty requirement always passes.
    assert!(IdentityRepo::has_all_permissions(&pool, user, &[]).await.unwrap());
}

// ---------------------------------------------------------------------------
// Delivery records
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn inbox_read_tracking(pool: DbPool) {
    let user = seed_user(&pool, "alice").await;
    let channel = ChannelRepo::upsert_definition(&pool, "email", "Email", None)
        .await
        .unwrap();
    let notification = NotificationRepo::upsert(&pool, "digest", "Digest", true, true)
        .await
        .unwrap();

    let first = DeliveryRecordRepo::create(
        &pool, user, notification.id, channel.id, true, Some("Digest"), None,
    )
    .await
    .unwrap();
    DeliveryRecordRepo::create(
        &pool, user, notification.id, channel.id, true, Some("Digest"), Some("/inbox"),
    )
    .await
    .unwrap();

    assert_eq!(DeliveryRecordRepo::unread_count(&pool, user).await.unwrap(), 2);

    assert!(DeliveryRecordRepo::mark_read(&pool, first, user).await.unwrap());
    // Already read: second call reports no change.
    assert!(!DeliveryRecordRepo::mark_read(&pool, first, user).await.unwrap());
    assert_eq!(DeliveryRecordRepo::unread_count(&pool, user).await.unwrap(), 1);

    let unread = DeliveryRecordRepo::list_for_user(&pool, user, true, 50, 0)
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);

    assert_eq!(DeliveryRecordRepo::mark_all_read(&pool, user).await.unwrap(), 1);
    assert_eq!(DeliveryRecordRepo::unread_count(&pool, user).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn mark_read_scoped_to_owner(pool: DbPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let channel = ChannelRepo::upsert_definition(&pool, "email", "Email", None)
        .await
        .unwrap();
    let notification = NotificationRepo::upsert(&pool, "digest", "Digest", true, true)
        .await
        .unwrap();

    let record = DeliveryRecordRepo::create(
        &pool, alice, notification.id, channel.id, true, None, None,
    )
    .await
    .unwrap();

    assert!(!DeliveryRecordRepo::mark_read(&pool, record, bob).await.unwrap());
    assert!(DeliveryRecordRepo::mark_read(&pool, record, alice).await.unwrap());
}

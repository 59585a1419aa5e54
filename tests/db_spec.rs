use gator::db::{Database, DirMigrations, EmbeddedMigrations, Store, StoreError};
use gator::models::*;
use speculate2::speculate;
use uuid::Uuid;

fn create_user(db: &Database, name: &str) -> User {
    db.create_user(CreateUserInput {
        name: name.to_string(),
    })
    .expect("Failed to create user")
}

fn create_feed(db: &Database, user: &User, name: &str, url: &str) -> Feed {
    db.create_feed(CreateFeedInput {
        name: name.to_string(),
        url: url.to_string(),
        user_id: user.id,
    })
    .expect("Failed to create feed")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.bootstrap(&EmbeddedMigrations).expect("Failed to apply schema");
    }

    describe "users" {
        describe "create_user" {
            it "assigns an id and matching timestamps" {
                let user = create_user(&db, "alice");

                assert_eq!(user.name, "alice");
                assert_ne!(user.id, Uuid::nil());
                assert_eq!(user.created_at, user.updated_at);
            }

            it "rejects a duplicate name as a conflict" {
                create_user(&db, "alice");

                let result = db.create_user(CreateUserInput { name: "alice".to_string() });
                assert!(matches!(result, Err(StoreError::Conflict(_))));

                let users = db.get_users().expect("Query failed");
                assert_eq!(users.len(), 1);
            }
        }

        describe "get_user_by_name" {
            it "returns None for an unknown name" {
                let result = db.get_user_by_name("nobody").expect("Query failed");
                assert!(result.is_none());
            }

            it "returns the stored record" {
                let created = create_user(&db, "alice");
                let found = db.get_user_by_name("alice").expect("Query failed");
                assert_eq!(found.expect("user missing").id, created.id);
            }
        }

        describe "get_user" {
            it "finds a user by id" {
                let created = create_user(&db, "alice");
                let found = db.get_user(created.id).expect("Query failed");
                assert_eq!(found.map(|u| u.name), Some("alice".to_string()));
            }
        }

        describe "get_users" {
            it "returns users ordered by name" {
                create_user(&db, "zed");
                create_user(&db, "amy");

                let names: Vec<String> = db.get_users().expect("Query failed")
                    .into_iter()
                    .map(|u| u.name)
                    .collect();
                assert_eq!(names, vec!["amy", "zed"]);
            }
        }

        describe "delete_users" {
            it "cascades to feeds and follows" {
                let user = create_user(&db, "alice");
                let feed = create_feed(&db, &user, "News", "http://news");
                db.create_feed_follow(CreateFeedFollowInput { user_id: user.id, feed_id: feed.id })
                    .expect("Failed to follow");

                assert_eq!(db.delete_users().expect("Delete failed"), 1);
                assert!(db.get_feeds().expect("Query failed").is_empty());
                assert!(db.get_feed_follows_for_user(user.id).expect("Query failed").is_empty());
            }
        }
    }

    describe "feeds" {
        describe "create_feed" {
            it "stores the owner" {
                let user = create_user(&db, "alice");
                let feed = create_feed(&db, &user, "News", "http://example.com/feed");

                assert_eq!(feed.user_id, user.id);
                let found = db.get_feed_by_url("http://example.com/feed").expect("Query failed");
                assert_eq!(found.expect("feed missing").id, feed.id);
            }

            it "rejects a duplicate URL as a conflict" {
                let user = create_user(&db, "alice");
                create_feed(&db, &user, "News", "http://example.com/feed");

                let result = db.create_feed(CreateFeedInput {
                    name: "Other".to_string(),
                    url: "http://example.com/feed".to_string(),
                    user_id: user.id,
                });
                assert!(matches!(result, Err(StoreError::Conflict(_))));
            }

            it "rejects an unknown owner" {
                let result = db.create_feed(CreateFeedInput {
                    name: "Orphan".to_string(),
                    url: "http://example.com/orphan".to_string(),
                    user_id: Uuid::new_v4(),
                });
                assert!(matches!(result, Err(StoreError::Sqlite(_))));
            }
        }

        describe "get_feed_by_url" {
            it "matches the URL exactly" {
                let user = create_user(&db, "alice");
                create_feed(&db, &user, "News", "http://example.com/feed");

                let result = db.get_feed_by_url("http://example.com/feed/").expect("Query failed");
                assert!(result.is_none());
            }
        }
    }

    describe "feed_follows" {
        describe "create_feed_follow" {
            it "returns the joined feed and user names" {
                let user = create_user(&db, "alice");
                let feed = create_feed(&db, &user, "News", "http://example.com/feed");

                let view = db.create_feed_follow(CreateFeedFollowInput {
                    user_id: user.id,
                    feed_id: feed.id,
                }).expect("Failed to follow");

                assert_eq!(view.feed_name, "News");
                assert_eq!(view.user_name, "alice");
                assert_eq!(view.follow.feed_id, feed.id);
            }

            it "rejects following the same feed twice" {
                let user = create_user(&db, "alice");
                let feed = create_feed(&db, &user, "News", "http://example.com/feed");
                let input = CreateFeedFollowInput { user_id: user.id, feed_id: feed.id };

                db.create_feed_follow(input.clone()).expect("Failed to follow");
                let result = db.create_feed_follow(input);
                assert!(matches!(result, Err(StoreError::Conflict(_))));
            }
        }

        describe "get_feed_follows_for_user" {
            it "lists only that user's follows, by feed name" {
                let alice = create_user(&db, "alice");
                let bob = create_user(&db, "bob");
                let news = create_feed(&db, &alice, "News", "http://news");
                let blog = create_feed(&db, &alice, "Blog", "http://blog");
                for feed in [&news, &blog] {
                    db.create_feed_follow(CreateFeedFollowInput { user_id: alice.id, feed_id: feed.id })
                        .expect("Failed to follow");
                }
                db.create_feed_follow(CreateFeedFollowInput { user_id: bob.id, feed_id: news.id })
                    .expect("Failed to follow");

                let names: Vec<String> = db.get_feed_follows_for_user(alice.id).expect("Query failed")
                    .into_iter()
                    .map(|f| f.feed_name)
                    .collect();
                assert_eq!(names, vec!["Blog", "News"]);
            }
        }

        describe "delete_feed_follow" {
            it "returns true when a follow was removed" {
                let user = create_user(&db, "alice");
                let feed = create_feed(&db, &user, "News", "http://news");
                db.create_feed_follow(CreateFeedFollowInput { user_id: user.id, feed_id: feed.id })
                    .expect("Failed to follow");

                assert!(db.delete_feed_follow(user.id, feed.id).expect("Delete failed"));
                assert!(db.get_feed_follows_for_user(user.id).expect("Query failed").is_empty());
            }

            it "returns false when nothing was followed" {
                let user = create_user(&db, "alice");
                let feed = create_feed(&db, &user, "News", "http://news");

                assert!(!db.delete_feed_follow(user.id, feed.id).expect("Delete failed"));
            }
        }
    }

    describe "reset" {
        it "removes users, feeds and follows but keeps the schema" {
            let user = create_user(&db, "alice");
            let feed = create_feed(&db, &user, "News", "http://news");
            db.create_feed_follow(CreateFeedFollowInput { user_id: user.id, feed_id: feed.id })
                .expect("Failed to follow");

            db.reset(&EmbeddedMigrations).expect("Reset failed");

            assert!(db.get_users().expect("Query failed").is_empty());
            assert!(db.get_feeds().expect("Query failed").is_empty());
            create_user(&db, "alice");
        }

        it "leaves data alone when the migration source cannot be read" {
            create_user(&db, "alice");

            let result = db.reset(&DirMigrations::new("/nonexistent/gator/migrations"));
            assert!(matches!(result, Err(StoreError::Io(_))));
            assert_eq!(db.get_users().expect("Query failed").len(), 1);
        }

        it "replays migrations from a directory in filename order" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            std::fs::write(
                dir.path().join("002_extra.sql"),
                "-- +goose Up\nALTER TABLE users ADD COLUMN nickname TEXT;\n-- +goose Down\n",
            ).expect("Failed to write");
            std::fs::write(
                dir.path().join("001_users.sql"),
                include_str!("../src/db/migrations/001_users.sql"),
            ).expect("Failed to write");
            std::fs::write(dir.path().join("000_noop.sql"), "-- nothing to do\n")
                .expect("Failed to write");

            db.reset(&DirMigrations::new(dir.path())).expect("Reset failed");

            create_user(&db, "alice");
            assert!(db.get_feeds().is_err());
        }
    }

    describe "bootstrap" {
        it "does not touch an existing schema" {
            create_user(&db, "alice");

            db.bootstrap(&EmbeddedMigrations).expect("Bootstrap failed");

            assert_eq!(db.get_users().expect("Query failed").len(), 1);
        }
    }
}

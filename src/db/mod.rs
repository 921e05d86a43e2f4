pub mod inbox_repository;
pub mod mock_db;
pub mod postgres_inbox_repository;
pub mod postgres_request_repository;
pub mod postgres_schedule_repository;
pub mod postgres_user_repository;
pub mod request_repository;
pub mod schedule_repository;
pub mod user_repository;

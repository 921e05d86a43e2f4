use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{
    availability::Availability,
    location::Location,
    message::Message,
    notification::Notification,
    organization::Organization,
    shift::Shift,
    swap::ShiftSwapRequest,
    time_off::{RequestStatus, TimeOffRequest},
    user::User,
};

use super::inbox_repository::{InboxRepository, NewMessage, NewNotification};
use super::request_repository::{NewShiftSwapRequest, NewTimeOffRequest, RequestRepository};
use super::schedule_repository::{
    LocationChanges, NewAvailability, NewLocation, NewShift, ScheduleRepository, ShiftChanges,
};
use super::user_repository::{NewUser, UserChanges, UserRepository};

fn mock_failure() -> sqlx::Error {
    sqlx::Error::Protocol("Mock DB failure".into())
}

/// In-memory stand-in for the Postgres repositories. One instance backs
/// all four traits so cross-entity effects (swap approval moving a
/// shift) stay observable from a single handle.
#[derive(Default)]
pub struct MockDb {
    pub should_fail: bool,
    /// Fail only notification inserts; exercises the best-effort fan-out.
    pub fail_notifications: bool,
    pub organizations: Mutex<Vec<Organization>>,
    pub users: Mutex<Vec<User>>,
    pub locations: Mutex<Vec<Location>>,
    pub shifts: Mutex<Vec<Shift>>,
    pub time_off: Mutex<Vec<TimeOffRequest>>,
    pub swaps: Mutex<Vec<ShiftSwapRequest>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub messages: Mutex<Vec<Message>>,
    pub availability: Mutex<Vec<Availability>>,
}

impl MockDb {
    fn check(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            Err(mock_failure())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn create_organization(&self, name: &str) -> Result<Organization, sqlx::Error> {
        self.check()?;
        let org = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
            plan_tier: "starter".to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.organizations.lock().unwrap().push(org.clone());
        Ok(org)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        self.check()?;
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned())
    }

    async fn find_user_in_org(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id && u.organization_id == organization_id)
            .cloned())
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        self.check()?;
        let user = User {
            id: Uuid::new_v4(),
            organization_id: new_user.organization_id,
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            phone: new_user.phone.clone(),
            role: new_user.role,
            hourly_rate: new_user.hourly_rate,
            position: new_user.position.clone(),
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn list_users(&self, organization_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        changes: &UserChanges,
    ) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let Some(user) = users
            .iter_mut()
            .find(|u| u.id == user_id && u.organization_id == organization_id)
        else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(phone) = &changes.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(position) = &changes.position {
            user.position = Some(position.clone());
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(rate) = changes.hourly_rate {
            user.hourly_rate = Some(rate);
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        Ok(Some(user.clone()))
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for MockDb {
    async fn create_location(&self, new_location: &NewLocation) -> Result<Location, sqlx::Error> {
        self.check()?;
        let location = Location {
            id: Uuid::new_v4(),
            organization_id: new_location.organization_id,
            name: new_location.name.clone(),
            address: new_location.address.clone(),
            timezone: new_location.timezone.clone(),
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.locations.lock().unwrap().push(location.clone());
        Ok(location)
    }

    async fn list_locations(&self, organization_id: Uuid) -> Result<Vec<Location>, sqlx::Error> {
        self.check()?;
        Ok(self
            .locations
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn update_location(
        &self,
        location_id: Uuid,
        organization_id: Uuid,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, sqlx::Error> {
        self.check()?;
        let mut locations = self.locations.lock().unwrap();
        let Some(location) = locations
            .iter_mut()
            .find(|l| l.id == location_id && l.organization_id == organization_id)
        else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            location.name = name.clone();
        }
        if let Some(address) = &changes.address {
            location.address = Some(address.clone());
        }
        if let Some(timezone) = &changes.timezone {
            location.timezone = timezone.clone();
        }
        if let Some(is_active) = changes.is_active {
            location.is_active = is_active;
        }
        Ok(Some(location.clone()))
    }

    async fn create_shift(&self, new_shift: &NewShift) -> Result<Shift, sqlx::Error> {
        self.check()?;
        let shift = Shift {
            id: Uuid::new_v4(),
            organization_id: new_shift.organization_id,
            location_id: new_shift.location_id,
            user_id: new_shift.user_id,
            start_time: new_shift.start_time,
            end_time: new_shift.end_time,
            position: new_shift.position.clone(),
            notes: new_shift.notes.clone(),
            status: new_shift.status,
            created_at: OffsetDateTime::now_utc(),
        };
        self.shifts.lock().unwrap().push(shift.clone());
        Ok(shift)
    }

    async fn list_shifts(&self, organization_id: Uuid) -> Result<Vec<Shift>, sqlx::Error> {
        self.check()?;
        Ok(self
            .shifts
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn find_shift(
        &self,
        shift_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Shift>, sqlx::Error> {
        self.check()?;
        Ok(self
            .shifts
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == shift_id && s.organization_id == organization_id)
            .cloned())
    }

    async fn update_shift(
        &self,
        shift_id: Uuid,
        organization_id: Uuid,
        changes: &ShiftChanges,
    ) -> Result<Option<Shift>, sqlx::Error> {
        self.check()?;
        let mut shifts = self.shifts.lock().unwrap();
        let Some(shift) = shifts
            .iter_mut()
            .find(|s| s.id == shift_id && s.organization_id == organization_id)
        else {
            return Ok(None);
        };
        if let Some(location_id) = changes.location_id {
            shift.location_id = location_id;
        }
        if let Some(user_id) = changes.user_id {
            shift.user_id = user_id;
        }
        if let Some(start_time) = changes.start_time {
            shift.start_time = start_time;
        }
        if let Some(end_time) = changes.end_time {
            shift.end_time = end_time;
        }
        if let Some(position) = &changes.position {
            shift.position = Some(position.clone());
        }
        if let Some(notes) = &changes.notes {
            shift.notes = Some(notes.clone());
        }
        if let Some(status) = changes.status {
            shift.status = status;
        }
        Ok(Some(shift.clone()))
    }

    async fn delete_shift(
        &self,
        shift_id: Uuid,
        organization_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut shifts = self.shifts.lock().unwrap();
        let before = shifts.len();
        shifts.retain(|s| !(s.id == shift_id && s.organization_id == organization_id));
        Ok(shifts.len() < before)
    }

    async fn create_availability(
        &self,
        new_availability: &NewAvailability,
    ) -> Result<Availability, sqlx::Error> {
        self.check()?;
        let entry = Availability {
            id: Uuid::new_v4(),
            user_id: new_availability.user_id,
            day_of_week: new_availability.day_of_week,
            start_time: new_availability.start_time.clone(),
            end_time: new_availability.end_time.clone(),
            is_available: new_availability.is_available,
        };
        self.availability.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn list_availability(&self, user_id: Uuid) -> Result<Vec<Availability>, sqlx::Error> {
        self.check()?;
        Ok(self
            .availability
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RequestRepository for MockDb {
    async fn create_time_off(
        &self,
        new_request: &NewTimeOffRequest,
    ) -> Result<TimeOffRequest, sqlx::Error> {
        self.check()?;
        let request = TimeOffRequest {
            id: Uuid::new_v4(),
            organization_id: new_request.organization_id,
            user_id: new_request.user_id,
            start_date: new_request.start_date,
            end_date: new_request.end_date,
            kind: new_request.kind,
            status: RequestStatus::Pending,
            reason: new_request.reason.clone(),
            reviewed_by: None,
            reviewed_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.time_off.lock().unwrap().push(request.clone());
        Ok(request)
    }

    async fn list_time_off(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<TimeOffRequest>, sqlx::Error> {
        self.check()?;
        Ok(self
            .time_off
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn list_time_off_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<TimeOffRequest>, sqlx::Error> {
        self.check()?;
        Ok(self
            .time_off
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.organization_id == organization_id && r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_time_off(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<TimeOffRequest>, sqlx::Error> {
        self.check()?;
        Ok(self
            .time_off
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == request_id && r.organization_id == organization_id)
            .cloned())
    }

    async fn review_time_off(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
        status: RequestStatus,
        reviewer_id: Uuid,
        reviewed_at: OffsetDateTime,
    ) -> Result<Option<TimeOffRequest>, sqlx::Error> {
        self.check()?;
        let mut requests = self.time_off.lock().unwrap();
        let Some(request) = requests.iter_mut().find(|r| {
            r.id == request_id
                && r.organization_id == organization_id
                && r.status == RequestStatus::Pending
        }) else {
            return Ok(None);
        };
        request.status = status;
        request.reviewed_by = Some(reviewer_id);
        request.reviewed_at = Some(reviewed_at);
        Ok(Some(request.clone()))
    }

    async fn create_swap(
        &self,
        new_request: &NewShiftSwapRequest,
    ) -> Result<ShiftSwapRequest, sqlx::Error> {
        self.check()?;
        let request = ShiftSwapRequest {
            id: Uuid::new_v4(),
            organization_id: new_request.organization_id,
            shift_id: new_request.shift_id,
            requester_id: new_request.requester_id,
            target_user_id: new_request.target_user_id,
            status: RequestStatus::Pending,
            reason: new_request.reason.clone(),
            reviewed_by: None,
            reviewed_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.swaps.lock().unwrap().push(request.clone());
        Ok(request)
    }

    async fn list_swaps(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<ShiftSwapRequest>, sqlx::Error> {
        self.check()?;
        Ok(self
            .swaps
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn list_swaps_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ShiftSwapRequest>, sqlx::Error> {
        self.check()?;
        Ok(self
            .swaps
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.organization_id == organization_id
                    && (r.requester_id == user_id || r.target_user_id == user_id)
            })
            .cloned()
            .collect())
    }

    async fn find_swap(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<ShiftSwapRequest>, sqlx::Error> {
        self.check()?;
        Ok(self
            .swaps
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == request_id && r.organization_id == organization_id)
            .cloned())
    }

    async fn deny_swap(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
        reviewer_id: Uuid,
        reviewed_at: OffsetDateTime,
    ) -> Result<Option<ShiftSwapRequest>, sqlx::Error> {
        self.check()?;
        let mut swaps = self.swaps.lock().unwrap();
        let Some(swap) = swaps.iter_mut().find(|r| {
            r.id == request_id
                && r.organization_id == organization_id
                && r.status == RequestStatus::Pending
        }) else {
            return Ok(None);
        };
        swap.status = RequestStatus::Denied;
        swap.reviewed_by = Some(reviewer_id);
        swap.reviewed_at = Some(reviewed_at);
        Ok(Some(swap.clone()))
    }

    async fn approve_swap_and_reassign(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
        reviewer_id: Uuid,
        reviewed_at: OffsetDateTime,
    ) -> Result<Option<ShiftSwapRequest>, sqlx::Error> {
        self.check()?;
        // Both collections mutate under their locks before returning,
        // mirroring the all-or-nothing transaction in Postgres.
        let mut swaps = self.swaps.lock().unwrap();
        let Some(swap) = swaps.iter_mut().find(|r| {
            r.id == request_id
                && r.organization_id == organization_id
                && r.status == RequestStatus::Pending
        }) else {
            return Ok(None);
        };
        swap.status = RequestStatus::Approved;
        swap.reviewed_by = Some(reviewer_id);
        swap.reviewed_at = Some(reviewed_at);
        let swap = swap.clone();

        let mut shifts = self.shifts.lock().unwrap();
        if let Some(shift) = shifts
            .iter_mut()
            .find(|s| s.id == swap.shift_id && s.organization_id == organization_id)
        {
            shift.user_id = Some(swap.target_user_id);
        }
        Ok(Some(swap))
    }
}

#[async_trait]
impl InboxRepository for MockDb {
    async fn create_notification(
        &self,
        new_notification: &NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        self.check()?;
        if self.fail_notifications {
            return Err(mock_failure());
        }
        let notification = Notification {
            id: Uuid::new_v4(),
            organization_id: new_notification.organization_id,
            user_id: new_notification.user_id,
            kind: new_notification.kind,
            title: new_notification.title.clone(),
            message: new_notification.message.clone(),
            is_read: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        self.check()?;
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, sqlx::Error> {
        self.check()?;
        let mut notifications = self.notifications.lock().unwrap();
        let Some(notification) = notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
        else {
            return Ok(None);
        };
        notification.is_read = true;
        Ok(Some(notification.clone()))
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        self.check()?;
        for notification in self
            .notifications
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|n| n.user_id == user_id)
        {
            notification.is_read = true;
        }
        Ok(())
    }

    async fn create_message(&self, new_message: &NewMessage) -> Result<Message, sqlx::Error> {
        self.check()?;
        let message = Message {
            id: Uuid::new_v4(),
            organization_id: new_message.organization_id,
            sender_id: new_message.sender_id,
            recipient_id: new_message.recipient_id,
            subject: new_message.subject.clone(),
            body: new_message.body.clone(),
            is_read: false,
            is_broadcast: new_message.is_broadcast,
            created_at: OffsetDateTime::now_utc(),
        };
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, organization_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
        self.check()?;
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn mark_message_read(
        &self,
        message_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Message>, sqlx::Error> {
        self.check()?;
        let mut messages = self.messages.lock().unwrap();
        let Some(message) = messages
            .iter_mut()
            .find(|m| m.id == message_id && m.organization_id == organization_id)
        else {
            return Ok(None);
        };
        message.is_read = true;
        Ok(Some(message.clone()))
    }
}

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::conflict::{find_booking_conflict, find_slot_conflict};
use super::{BookingEngine, load_details};
use crate::errors::{BookingError, BookingResult};
use crate::models::appointment::{
    Appointment, AppointmentDetails, AppointmentStatus, BookingRequest, NewAppointment,
};
use crate::models::caller::CallerScope;
use crate::models::time_range::TimeRange;
use crate::models::time_slot::{NewTimeSlot, SlotRef, TimeSlot};
use crate::store::{AppointmentQuery, CalendarTx, SlotQuery};

impl BookingEngine {
    /// Books an appointment on the master's calendar.
    ///
    /// The end time is derived from the service (or chosen option) duration.
    /// Clients and admins create pending appointments; a master booking into
    /// their own calendar creates a confirmed one.
    pub async fn create_appointment(
        &self,
        scope: CallerScope,
        request: BookingRequest,
    ) -> BookingResult<AppointmentDetails> {
        let status = match scope {
            CallerScope::Client(user_id) if user_id != request.user_id => {
                return Err(BookingError::Authorization(
                    "Clients may only book for themselves".to_string(),
                ));
            }
            CallerScope::Master(master_id) if master_id != request.master_id => {
                return Err(BookingError::Authorization(
                    "Masters may only book into their own calendar".to_string(),
                ));
            }
            CallerScope::Master(_) => AppointmentStatus::Confirmed,
            CallerScope::Client(_) | CallerScope::Admin => AppointmentStatus::Pending,
        };

        let mut tx = self.begin().await?;

        let service = tx
            .find_service(request.service_id)
            .await?
            .filter(|service| service.master_id == request.master_id)
            .ok_or_else(|| {
                BookingError::NotFound(format!(
                    "Service {} not found for master {}",
                    request.service_id, request.master_id
                ))
            })?;
        let duration = service.booking_duration(request.service_option_id)?;
        let range = TimeRange::checked(request.start, request.start + duration)?;

        tx.lock_master_calendar(request.master_id).await?;

        if let Some(source) = find_booking_conflict(tx.as_mut(), request.master_id, range, None).await? {
            warn!(
                master_id = %request.master_id,
                start = %range.start,
                end = %range.end,
                conflict = %source,
                "Rejected overlapping appointment"
            );
            return Err(source.into());
        }

        // Claim a declared slot for this exact interval, if one is free.
        let claimed = tx
            .find_slots(
                &SlotQuery::exact(request.master_id, range)
                    .service(request.service_id)
                    .booked(false),
            )
            .await?
            .into_iter()
            .next();
        if let Some(slot) = &claimed {
            tx.mark_slot_booked(slot.id, true).await?;
        }

        let inserted = tx
            .insert_appointment(NewAppointment {
                user_id: request.user_id,
                master_id: request.master_id,
                service_id: request.service_id,
                service_option_id: request.service_option_id,
                range,
                status,
                notes: request.notes,
            })
            .await;

        let appointment = match inserted {
            Ok(appointment) => appointment,
            Err(err) => {
                if let Some(slot) = &claimed {
                    if let Err(release_err) = tx.mark_slot_booked(slot.id, false).await {
                        error!(
                            slot_id = %slot.id,
                            error = %release_err,
                            "Failed to release claimed slot after appointment insert failure"
                        );
                    }
                }
                error!(master_id = %request.master_id, error = %err, "Failed to insert appointment");
                return Err(err);
            }
        };

        if status == AppointmentStatus::Confirmed {
            propagate_confirmation(tx.as_mut(), &appointment).await?;
        }

        let details = load_details(tx.as_mut(), appointment.id).await?;
        tx.commit().await?;

        info!(
            appointment_id = %appointment.id,
            master_id = %appointment.master_id,
            status = %appointment.status,
            "Created appointment"
        );
        Ok(details)
    }

    /// Moves a pending appointment to confirmed and books every slot of the
    /// master at that interval. Confirming twice is a no-op.
    pub async fn confirm_appointment(
        &self,
        scope: CallerScope,
        appointment_id: Uuid,
    ) -> BookingResult<AppointmentDetails> {
        let mut tx = self.begin().await?;
        let appointment = load_managed(tx.as_mut(), scope, appointment_id).await?;

        match appointment.status {
            AppointmentStatus::Pending => {
                tx.update_appointment_status(appointment.id, AppointmentStatus::Confirmed)
                    .await?;
            }
            AppointmentStatus::Confirmed => {}
            other => {
                return Err(BookingError::Validation(format!(
                    "Cannot confirm a {} appointment",
                    other
                )));
            }
        }

        propagate_confirmation(tx.as_mut(), &appointment).await?;

        let details = load_details(tx.as_mut(), appointment.id).await?;
        tx.commit().await?;

        info!(appointment_id = %appointment.id, "Confirmed appointment");
        Ok(details)
    }

    /// Rejects an appointment and frees the slot it held for its service.
    ///
    /// Confirmed appointments may be rejected as well as pending ones, which
    /// lets a master withdraw a booking after accepting it. Rejecting an
    /// already rejected appointment changes nothing.
    pub async fn reject_appointment(
        &self,
        scope: CallerScope,
        appointment_id: Uuid,
    ) -> BookingResult<AppointmentDetails> {
        let mut tx = self.begin().await?;
        let appointment = load_managed(tx.as_mut(), scope, appointment_id).await?;

        match appointment.status {
            AppointmentStatus::Pending | AppointmentStatus::Confirmed => {
                tx.update_appointment_status(appointment.id, AppointmentStatus::Rejected)
                    .await?;
                release_slots(tx.as_mut(), &appointment).await?;
            }
            AppointmentStatus::Rejected => {}
            AppointmentStatus::Cancelled => {
                return Err(BookingError::Validation(
                    "Cannot reject a cancelled appointment".to_string(),
                ));
            }
        }

        let details = load_details(tx.as_mut(), appointment.id).await?;
        tx.commit().await?;

        info!(appointment_id = %appointment.id, "Rejected appointment");
        Ok(details)
    }

    /// Declares a bookable slot. Only the same service's slots and active
    /// appointments are checked for overlap.
    pub async fn create_slot(
        &self,
        master_id: Uuid,
        service_id: Uuid,
        range: TimeRange,
    ) -> BookingResult<TimeSlot> {
        let range = TimeRange::checked(range.start, range.end)?;

        let mut tx = self.begin().await?;
        ensure_service_of(tx.as_mut(), master_id, service_id).await?;
        tx.lock_master_calendar(master_id).await?;

        if let Some(source) = find_slot_conflict(tx.as_mut(), master_id, service_id, range, None).await? {
            warn!(%master_id, %service_id, conflict = %source, "Rejected overlapping time slot");
            return Err(source.into());
        }

        let slot = tx
            .insert_slot(NewTimeSlot {
                master_id,
                service_id,
                range,
                is_booked: false,
            })
            .await?;
        tx.commit().await?;

        info!(slot_id = %slot.id, %master_id, "Created time slot");
        Ok(slot)
    }

    /// Moves an unbooked slot. Missing bounds keep their current value.
    pub async fn update_slot(
        &self,
        master_id: Uuid,
        slot_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> BookingResult<TimeSlot> {
        let mut tx = self.begin().await?;
        tx.lock_master_calendar(master_id).await?;
        let slot = load_own_slot(tx.as_mut(), master_id, slot_id).await?;
        if slot.is_booked {
            return Err(BookingError::Validation(
                "Cannot update a booked time slot".to_string(),
            ));
        }

        let range = TimeRange::checked(
            start.unwrap_or(slot.start_time),
            end.unwrap_or(slot.end_time),
        )?;

        if let Some(source) =
            find_slot_conflict(tx.as_mut(), master_id, slot.service_id, range, Some(slot.id)).await?
        {
            warn!(%slot_id, conflict = %source, "Rejected overlapping time slot update");
            return Err(source.into());
        }

        let updated = tx.reschedule_slot(slot.id, range).await?;
        tx.commit().await?;

        info!(%slot_id, "Updated time slot");
        Ok(updated)
    }

    /// Soft-deletes an unbooked slot.
    pub async fn delete_slot(&self, master_id: Uuid, slot_id: Uuid) -> BookingResult<()> {
        let mut tx = self.begin().await?;
        tx.lock_master_calendar(master_id).await?;
        let slot = load_own_slot(tx.as_mut(), master_id, slot_id).await?;
        if slot.is_booked {
            return Err(BookingError::Validation(
                "Cannot delete a booked time slot".to_string(),
            ));
        }

        tx.soft_delete_slot(slot.id).await?;
        tx.commit().await?;

        info!(%slot_id, "Deleted time slot");
        Ok(())
    }

    /// Sets a slot's booked flag by hand, e.g. to block out time. Addressing a
    /// slot by interval creates it when absent.
    pub async fn toggle_slot_booking(
        &self,
        master_id: Uuid,
        slot: SlotRef,
        booked: bool,
    ) -> BookingResult<TimeSlot> {
        let mut tx = self.begin().await?;

        let result = match slot {
            SlotRef::Id(slot_id) => {
                tx.lock_master_calendar(master_id).await?;
                let mut slot = load_own_slot(tx.as_mut(), master_id, slot_id).await?;
                tx.mark_slot_booked(slot.id, booked).await?;
                slot.is_booked = booked;
                slot
            }
            SlotRef::Interval { service_id, range } => {
                let range = TimeRange::checked(range.start, range.end)?;
                ensure_service_of(tx.as_mut(), master_id, service_id).await?;
                tx.lock_master_calendar(master_id).await?;
                tx.upsert_slot(NewTimeSlot {
                    master_id,
                    service_id,
                    range,
                    is_booked: booked,
                })
                .await?
            }
        };
        tx.commit().await?;

        info!(slot_id = %result.id, booked, "Toggled time slot");
        Ok(result)
    }
}

/// Loads an appointment for a status transition, under the master's lock.
async fn load_managed(
    tx: &mut dyn CalendarTx,
    scope: CallerScope,
    appointment_id: Uuid,
) -> BookingResult<Appointment> {
    if let CallerScope::Client(_) = scope {
        return Err(BookingError::Authorization(
            "Only masters and admins may change appointment status".to_string(),
        ));
    }

    let not_found = || BookingError::NotFound(format!("Appointment {} not found", appointment_id));

    let appointment = tx
        .find_appointment(appointment_id)
        .await?
        .filter(|appointment| scope.manages(appointment.master_id))
        .ok_or_else(not_found)?;

    tx.lock_master_calendar(appointment.master_id).await?;

    // Re-read under the lock; another writer may have moved it meanwhile.
    tx.find_appointment(appointment_id).await?.ok_or_else(not_found)
}

async fn load_own_slot(tx: &mut dyn CalendarTx, master_id: Uuid, slot_id: Uuid) -> BookingResult<TimeSlot> {
    tx.find_slot(slot_id)
        .await?
        .filter(|slot| slot.master_id == master_id)
        .ok_or_else(|| BookingError::NotFound(format!("Time slot {} not found", slot_id)))
}

async fn ensure_service_of(tx: &mut dyn CalendarTx, master_id: Uuid, service_id: Uuid) -> BookingResult<()> {
    match tx.find_service(service_id).await? {
        Some(service) if service.master_id == master_id => Ok(()),
        _ => Err(BookingError::NotFound(format!(
            "Service {} not found for master {}",
            service_id, master_id
        ))),
    }
}

/// Books all of the master's slots at the appointment's interval and makes
/// sure the appointment's own service has one.
async fn propagate_confirmation(tx: &mut dyn CalendarTx, appointment: &Appointment) -> BookingResult<()> {
    let range = appointment.range();
    tx.book_slots_at(appointment.master_id, range).await?;

    let own = SlotQuery::exact(appointment.master_id, range).service(appointment.service_id);
    if tx.find_slots(&own).await?.is_empty() {
        tx.insert_slot(NewTimeSlot {
            master_id: appointment.master_id,
            service_id: appointment.service_id,
            range,
            is_booked: true,
        })
        .await?;
    }
    Ok(())
}

/// Unbooks the appointment's own service slot at its interval unless another
/// active appointment still covers it. Blocks on other services stay put.
async fn release_slots(tx: &mut dyn CalendarTx, appointment: &Appointment) -> BookingResult<()> {
    let held = SlotQuery::exact(appointment.master_id, appointment.range())
        .service(appointment.service_id)
        .booked(true);
    for slot in tx.find_slots(&held).await? {
        let others = AppointmentQuery::active_for_master(appointment.master_id)
            .overlapping(slot.range())
            .excluding(appointment.id);
        if tx.find_appointments(&others).await?.is_empty() {
            tx.mark_slot_booked(slot.id, false).await?;
        }
    }
    Ok(())
}

use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::options::{
    ClientOptions, FindOneOptions, FindOptions, FindOneAndUpdateOptions, IndexOptions,
    ReturnDocument, ServerApi, ServerApiVersion,
};
use mongodb::{Client, Collection, IndexModel};
use futures_util::TryStreamExt;
use std::env;

use crate::models::{
    AdminUser, ApiError, AvailabilityOverride, Booking, BookingStatus, CatalogItem, CatalogKind,
    Service, SlotReservation, StatusHistoryEntry, StoreConfig, UpdateCatalogItemRequest,
    UpdateServiceRequest,
};

#[derive(Clone)]
pub struct MongoDBService {
    bookings: Collection<Booking>,
    services: Collection<Service>,
    vehicle_types: Collection<CatalogItem>,
    scents: Collection<CatalogItem>,
    optional_services: Collection<CatalogItem>,
    availability: Collection<AvailabilityOverride>,
    slot_reservations: Collection<SlotReservation>,
    store_config: Collection<StoreConfig>,
    users: Collection<AdminUser>,
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    e.to_string().contains("E11000 duplicate key error")
}

/// Filter for a status transition: matches the booking only while it still
/// holds the status the caller observed.
fn transition_filter(id: &ObjectId, from: BookingStatus) -> Result<Document, ApiError> {
    Ok(doc! {
        "_id": id,
        "status": to_bson(&from).map_err(|e| ApiError::Internal(e.to_string()))?,
    })
}

impl MongoDBService {
    pub async fn init() -> Result<Self, mongodb::error::Error> {
        let uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");

        let mut client_options = ClientOptions::parse(&uri).await?;
        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        client_options.server_api = Some(server_api);
        client_options.connect_timeout = Some(std::time::Duration::from_secs(10));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Test connection
        client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await?;

        log::info!("Successfully connected to MongoDB");

        let db = client.database("detailing");
        let bookings = db.collection::<Booking>("bookings");
        let services = db.collection::<Service>("services");
        let vehicle_types = db.collection::<CatalogItem>(CatalogKind::VehicleTypes.collection_name());
        let scents = db.collection::<CatalogItem>(CatalogKind::Scents.collection_name());
        let optional_services =
            db.collection::<CatalogItem>(CatalogKind::OptionalServices.collection_name());
        let availability = db.collection::<AvailabilityOverride>("availability");
        let slot_reservations = db.collection::<SlotReservation>("slot_reservations");
        let store_config = db.collection::<StoreConfig>("store_config");
        let users = db.collection::<AdminUser>("users");

        // Confirmation numbers are globally unique
        let unique = IndexOptions::builder().unique(true).build();
        bookings
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "confirmationNumber": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;

        // Slot lookups by normalized start time
        bookings
            .create_index(
                IndexModel::builder().keys(doc! { "slotStart": 1 }).build(),
                None,
            )
            .await?;
        bookings
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "status": 1, "createdAt": -1 })
                    .build(),
                None,
            )
            .await?;

        // One counter document per slot; the unique index is what makes the
        // insert-or-increment reservation safe under concurrent writers
        slot_reservations
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "slot_start": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;

        availability
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "date": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;

        users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique)
                    .build(),
                None,
            )
            .await?;

        for col in [&vehicle_types, &scents, &optional_services] {
            col.create_index(
                IndexModel::builder().keys(doc! { "sortOrder": 1 }).build(),
                None,
            )
            .await?;
        }

        Ok(Self {
            bookings,
            services,
            vehicle_types,
            scents,
            optional_services,
            availability,
            slot_reservations,
            store_config,
            users,
        })
    }

    // ---- bookings ----------------------------------------------------------

    pub async fn insert_booking(&self, booking: Booking) -> Result<Booking, ApiError> {
        match self.bookings.insert_one(booking.clone(), None).await {
            Ok(_) => Ok(booking),
            Err(e) if is_duplicate_key(&e) => Err(ApiError::Duplicate(
                "Confirmation number already in use".to_string(),
            )),
            Err(e) => Err(ApiError::Database(e)),
        }
    }

    pub async fn get_booking(&self, id: &ObjectId) -> Result<Option<Booking>, ApiError> {
        Ok(self.bookings.find_one(doc! { "_id": id }, None).await?)
    }

    pub async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        date: Option<&str>,
    ) -> Result<Vec<Booking>, ApiError> {
        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert(
                "status",
                to_bson(&status).map_err(|e| ApiError::Internal(e.to_string()))?,
            );
        }
        if let Some(date) = date {
            filter.insert("slotDate", date);
        }
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        Ok(self.bookings.find(filter, options).await?.try_collect().await?)
    }

    pub async fn bookings_between(&self, start: i64, end: i64) -> Result<Vec<Booking>, ApiError> {
        let filter = doc! { "slotStart": { "$gte": start, "$lt": end } };
        let options = FindOptions::builder().sort(doc! { "slotStart": 1 }).build();
        Ok(self.bookings.find(filter, options).await?.try_collect().await?)
    }

    /// Non-cancelled bookings holding a given slot.
    pub async fn count_active_bookings_at(&self, slot_start: i64) -> Result<u64, ApiError> {
        let filter = doc! {
            "slotStart": slot_start,
            "status": { "$ne": "cancelled" }
        };
        Ok(self.bookings.count_documents(filter, None).await?)
    }

    pub async fn count_bookings_with_status(&self, status: BookingStatus) -> Result<u64, ApiError> {
        let filter = doc! {
            "status": to_bson(&status).map_err(|e| ApiError::Internal(e.to_string()))?
        };
        Ok(self.bookings.count_documents(filter, None).await?)
    }

    /// Guarded transition: the filter matches only while the booking still
    /// holds the expected prior status, and the update sets the new status
    /// and appends its history entry in one operation. Two concurrent
    /// requests for the same transition cannot both match. Returns None
    /// when the booking is missing or its status moved underneath us.
    pub async fn update_booking_status(
        &self,
        id: &ObjectId,
        from: BookingStatus,
        to: BookingStatus,
        note: Option<String>,
        timestamp: i64,
    ) -> Result<Option<Booking>, ApiError> {
        let entry = StatusHistoryEntry {
            status: to,
            timestamp,
            note,
        };
        let update = doc! {
            "$set": {
                "status": to_bson(&to).map_err(|e| ApiError::Internal(e.to_string()))?
            },
            "$push": {
                "statusHistory": to_bson(&entry).map_err(|e| ApiError::Internal(e.to_string()))?
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .bookings
            .find_one_and_update(transition_filter(id, from)?, update, options)
            .await?)
    }

    pub async fn delete_all_bookings(&self) -> Result<u64, ApiError> {
        let result = self.bookings.delete_many(doc! {}, None).await?;
        // Counters are meaningless once the bookings are gone
        self.slot_reservations.delete_many(doc! {}, None).await?;
        Ok(result.deleted_count)
    }

    // ---- slot reservation (conditional increment) ---------------------------

    /// Atomically takes one unit of capacity for a slot. Returns false when
    /// the slot is already at capacity. The conditional filter plus the
    /// unique `slot_start` index close the read-then-write race: two
    /// concurrent requests for the last unit cannot both match.
    pub async fn reserve_slot(&self, slot_start: i64, capacity: u32) -> Result<bool, ApiError> {
        let filter = doc! {
            "slot_start": slot_start,
            "count": { "$lt": capacity as i64 }
        };
        let update = doc! { "$inc": { "count": 1 } };

        let result = self
            .slot_reservations
            .update_one(filter.clone(), update.clone(), None)
            .await?;
        if result.modified_count == 1 {
            return Ok(true);
        }

        // No matching counter: the slot is either untouched or full. Try to
        // create the counter; losing the insert race means another writer
        // created it first, so retry the conditional increment once.
        let fresh = SlotReservation {
            id: None,
            slot_start,
            count: 1,
        };
        match self.slot_reservations.insert_one(fresh, None).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key(&e) => {
                let retry = self.slot_reservations.update_one(filter, update, None).await?;
                Ok(retry.modified_count == 1)
            }
            Err(e) => Err(ApiError::Database(e)),
        }
    }

    /// Returns one unit of capacity (on cancellation). Floored at zero.
    pub async fn release_slot(&self, slot_start: i64) -> Result<(), ApiError> {
        self.slot_reservations
            .update_one(
                doc! { "slot_start": slot_start, "count": { "$gt": 0 } },
                doc! { "$inc": { "count": -1 } },
                None,
            )
            .await?;
        Ok(())
    }

    // ---- services -----------------------------------------------------------

    pub async fn list_services(&self, only_active: bool) -> Result<Vec<Service>, ApiError> {
        let filter = if only_active {
            doc! { "active": true }
        } else {
            doc! {}
        };
        let options = FindOptions::builder().sort(doc! { "sortOrder": 1 }).build();
        Ok(self.services.find(filter, options).await?.try_collect().await?)
    }

    pub async fn get_service(&self, id: &ObjectId) -> Result<Option<Service>, ApiError> {
        Ok(self.services.find_one(doc! { "_id": id }, None).await?)
    }

    pub async fn create_service(&self, service: Service) -> Result<String, ApiError> {
        let result = self.services.insert_one(service, None).await?;
        result
            .inserted_id
            .as_object_id()
            .map(|id| id.to_hex())
            .ok_or_else(|| ApiError::Internal("Inserted id was not an ObjectId".to_string()))
    }

    pub async fn update_service(
        &self,
        id: &ObjectId,
        update: UpdateServiceRequest,
    ) -> Result<bool, ApiError> {
        let mut update_doc = Document::new();
        if let Some(name) = update.name {
            update_doc.insert("name", name);
        }
        if let Some(category) = update.category {
            update_doc.insert(
                "category",
                to_bson(&category).map_err(|e| ApiError::Internal(e.to_string()))?,
            );
        }
        if let Some(description) = update.description {
            update_doc.insert("description", description);
        }
        if let Some(features) = update.features {
            update_doc.insert(
                "features",
                to_bson(&features).map_err(|e| ApiError::Internal(e.to_string()))?,
            );
        }
        if let Some(prices) = update.prices {
            update_doc.insert(
                "prices",
                to_bson(&prices).map_err(|e| ApiError::Internal(e.to_string()))?,
            );
        }
        if let Some(active) = update.active {
            update_doc.insert("active", active);
        }
        if let Some(sort_order) = update.sort_order {
            update_doc.insert("sortOrder", sort_order);
        }
        if update_doc.is_empty() {
            return Err(ApiError::Validation("No fields to update".to_string()));
        }
        let result = self
            .services
            .update_one(doc! { "_id": id }, doc! { "$set": update_doc }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// "Delete" keeps the document so historical bookings stay resolvable.
    pub async fn deactivate_service(&self, id: &ObjectId) -> Result<bool, ApiError> {
        let result = self
            .services
            .update_one(doc! { "_id": id }, doc! { "$set": { "active": false } }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    // ---- catalog lookups ------------------------------------------------------

    fn catalog(&self, kind: CatalogKind) -> &Collection<CatalogItem> {
        match kind {
            CatalogKind::VehicleTypes => &self.vehicle_types,
            CatalogKind::Scents => &self.scents,
            CatalogKind::OptionalServices => &self.optional_services,
        }
    }

    pub async fn list_catalog(
        &self,
        kind: CatalogKind,
        only_active: bool,
    ) -> Result<Vec<CatalogItem>, ApiError> {
        let filter = if only_active {
            doc! { "active": true }
        } else {
            doc! {}
        };
        let options = FindOptions::builder().sort(doc! { "sortOrder": 1 }).build();
        Ok(self
            .catalog(kind)
            .find(filter, options)
            .await?
            .try_collect()
            .await?)
    }

    pub async fn get_catalog_item(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogItem>, ApiError> {
        Ok(self.catalog(kind).find_one(doc! { "id": id }, None).await?)
    }

    pub async fn get_catalog_items(
        &self,
        kind: CatalogKind,
        ids: &[i32],
    ) -> Result<Vec<CatalogItem>, ApiError> {
        let filter = doc! { "id": { "$in": ids.to_vec() } };
        Ok(self
            .catalog(kind)
            .find(filter, None)
            .await?
            .try_collect()
            .await?)
    }

    pub async fn create_catalog_item(
        &self,
        kind: CatalogKind,
        label: String,
        price: Option<f64>,
        sort_order: i32,
    ) -> Result<CatalogItem, ApiError> {
        // Numeric ids are allocated as max+1; admin edits are rare enough
        // that the window between read and insert does not matter here
        let options = FindOneOptions::builder().sort(doc! { "id": -1 }).build();
        let next_id = self
            .catalog(kind)
            .find_one(doc! {}, options)
            .await?
            .map(|item| item.id + 1)
            .unwrap_or(1);

        let item = CatalogItem {
            oid: None,
            id: next_id,
            label,
            price,
            active: true,
            sort_order,
        };
        self.catalog(kind).insert_one(item.clone(), None).await?;
        Ok(item)
    }

    pub async fn update_catalog_item(
        &self,
        kind: CatalogKind,
        id: i32,
        update: UpdateCatalogItemRequest,
    ) -> Result<bool, ApiError> {
        let mut update_doc = Document::new();
        if let Some(label) = update.label {
            update_doc.insert("label", label);
        }
        if let Some(price) = update.price {
            update_doc.insert("price", price);
        }
        if let Some(active) = update.active {
            update_doc.insert("active", active);
        }
        if let Some(sort_order) = update.sort_order {
            update_doc.insert("sortOrder", sort_order);
        }
        if update_doc.is_empty() {
            return Err(ApiError::Validation("No fields to update".to_string()));
        }
        let result = self
            .catalog(kind)
            .update_one(doc! { "id": id }, doc! { "$set": update_doc }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn deactivate_catalog_item(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<bool, ApiError> {
        let result = self
            .catalog(kind)
            .update_one(doc! { "id": id }, doc! { "$set": { "active": false } }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    // ---- availability -----------------------------------------------------

    pub async fn get_availability(
        &self,
        date: &str,
    ) -> Result<Option<AvailabilityOverride>, ApiError> {
        Ok(self.availability.find_one(doc! { "date": date }, None).await?)
    }

    pub async fn list_availability(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<AvailabilityOverride>, ApiError> {
        let mut range = Document::new();
        if let Some(from) = from {
            range.insert("$gte", from);
        }
        if let Some(to) = to {
            range.insert("$lte", to);
        }
        let filter = if range.is_empty() {
            doc! {}
        } else {
            doc! { "date": range }
        };
        let options = FindOptions::builder().sort(doc! { "date": 1 }).build();
        Ok(self
            .availability
            .find(filter, options)
            .await?
            .try_collect()
            .await?)
    }

    pub async fn upsert_availability(
        &self,
        record: &AvailabilityOverride,
    ) -> Result<(), ApiError> {
        let update = doc! {
            "$set": {
                "allDayBlocked": record.all_day_blocked,
                "blockedTimes": to_bson(&record.blocked_times)
                    .map_err(|e| ApiError::Internal(e.to_string()))?,
                "recurrence": to_bson(&record.recurrence)
                    .map_err(|e| ApiError::Internal(e.to_string()))?,
                "maxBookingsPerSlot": to_bson(&record.max_bookings_per_slot)
                    .map_err(|e| ApiError::Internal(e.to_string()))?,
            }
        };
        let options = mongodb::options::UpdateOptions::builder().upsert(true).build();
        self.availability
            .update_one(doc! { "date": &record.date }, update, options)
            .await?;
        Ok(())
    }

    pub async fn delete_availability(&self, date: &str) -> Result<(), ApiError> {
        self.availability.delete_one(doc! { "date": date }, None).await?;
        Ok(())
    }

    /// All weekly-recurring records; the caller filters by weekday.
    pub async fn list_recurring_availability(
        &self,
    ) -> Result<Vec<AvailabilityOverride>, ApiError> {
        Ok(self
            .availability
            .find(doc! { "recurrence": "weekly" }, None)
            .await?
            .try_collect()
            .await?)
    }

    // ---- store config -------------------------------------------------------

    pub async fn get_active_store_config(&self) -> Result<Option<StoreConfig>, ApiError> {
        Ok(self
            .store_config
            .find_one(doc! { "active": true }, None)
            .await?)
    }

    /// Single-active-record rule: deactivate siblings, then insert.
    pub async fn save_store_config(&self, mut config: StoreConfig) -> Result<StoreConfig, ApiError> {
        self.store_config
            .update_many(
                doc! { "active": true },
                doc! { "$set": { "active": false } },
                None,
            )
            .await?;
        config.active = true;
        config.id = None;
        self.store_config.insert_one(config.clone(), None).await?;
        Ok(config)
    }

    // ---- users ---------------------------------------------------------------

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<AdminUser>, ApiError> {
        Ok(self.users.find_one(doc! { "email": email }, None).await?)
    }

    pub async fn create_user(&self, user: AdminUser) -> Result<(), ApiError> {
        match self.users.insert_one(user, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(ApiError::Duplicate("User already exists".to_string()))
            }
            Err(e) => Err(ApiError::Database(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_filter_pins_prior_status() {
        let id = ObjectId::new();
        let filter = transition_filter(&id, BookingStatus::Pending).unwrap();
        assert_eq!(filter.get_object_id("_id").unwrap(), id);
        // A booking already moved off the expected status cannot match,
        // so a second concurrent cancel finds nothing to update
        assert_eq!(filter.get_str("status").unwrap(), "pending");

        let filter = transition_filter(&id, BookingStatus::InProgress).unwrap();
        assert_eq!(filter.get_str("status").unwrap(), "in_progress");
    }
}

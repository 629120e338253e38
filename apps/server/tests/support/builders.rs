use serde_json::{json, Value};

pub struct EventBuilder {
    doc: Value,
}

impl EventBuilder {
    pub fn new(id: &str, tenant: &str, title: &str) -> Self {
        Self {
            doc: json!({
                "_id": id,
                "tenantId": tenant,
                "title": title,
                "type": "CONFERENCE",
                "status": "PUBLISHED",
                "startDate": "2024-05-01T08:00:00.000Z",
                "endDate": "2024-05-03T18:00:00.000Z",
                "locations": [],
                "isPublic": true,
                "eventScheduleIds": [],
            }),
        }
    }

    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.doc[field] = value;
        self
    }

    pub fn dates(self, start: &str, end: &str) -> Self {
        self.set("startDate", json!(start)).set("endDate", json!(end))
    }

    pub fn location(mut self, name: &str, address: &str) -> Self {
        if let Some(locations) = self.doc["locations"].as_array_mut() {
            locations.push(json!({ "name": name, "address": address }));
        }
        self
    }

    pub fn schedules(self, ids: &[&str]) -> Self {
        self.set("eventScheduleIds", json!(ids))
    }

    pub fn build(self) -> Value {
        self.doc
    }
}

pub struct ScheduleBuilder {
    doc: Value,
}

impl ScheduleBuilder {
    pub fn new(id: &str, tenant: &str, event_id: &str, title: &str) -> Self {
        Self {
            doc: json!({
                "_id": id,
                "tenantId": tenant,
                "eventId": event_id,
                "title": title,
                "sessionType": "SESSION",
                "startTime": "2024-05-01T09:00:00.000Z",
                "endTime": "2024-05-01T10:00:00.000Z",
                "speakers": [],
            }),
        }
    }

    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.doc[field] = value;
        self
    }

    pub fn times(self, start: &str, end: &str) -> Self {
        self.set("startTime", json!(start)).set("endTime", json!(end))
    }

    pub fn speakers(self, ids: &[&str]) -> Self {
        self.set("speakers", json!(ids))
    }

    pub fn build(self) -> Value {
        self.doc
    }
}

pub fn speaker(id: &str, tenant: &str, name: &str, company: &str, bio: &str) -> Value {
    json!({
        "_id": id,
        "tenantId": tenant,
        "name": name,
        "company": company,
        "bio": bio,
        "email": format!("{}@example.com", name.to_lowercase()),
        "speakerType": "SPEAKER",
    })
}

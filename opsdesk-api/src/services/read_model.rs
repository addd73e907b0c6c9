use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Attachment, Comment, Facility, Incident, PublicUser, User};

/// Incident enriched with every related row the UI needs in one response.
#[derive(Debug, Serialize)]
pub struct IncidentView {
    #[serde(flatten)]
    pub incident: Incident,
    pub reporter: Option<PublicUser>,
    pub assignee: Option<PublicUser>,
    pub facility: Option<Facility>,
    pub attachments: Vec<Attachment>,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<CommentAuthor>,
}

/// Denormalized author lookup attached at read time, never stored.
#[derive(Debug, Serialize)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub name: String,
    pub role: String,
}

/// Merge incidents with their related rows, joining by id in memory.
///
/// The incident ordering of the input is preserved (the query sorts
/// newest-first); comments are re-sorted oldest-first per incident.
pub fn assemble(
    incidents: Vec<Incident>,
    users: &[User],
    facilities: &[Facility],
    attachments: Vec<Attachment>,
    comments: Vec<Comment>,
) -> Vec<IncidentView> {
    let users_by_id: HashMap<Uuid, &User> = users.iter().map(|u| (u.id, u)).collect();
    let facilities_by_id: HashMap<Uuid, &Facility> =
        facilities.iter().map(|f| (f.id, f)).collect();

    let mut attachments_by_incident: HashMap<Uuid, Vec<Attachment>> = HashMap::new();
    for a in attachments {
        attachments_by_incident.entry(a.incident_id).or_default().push(a);
    }

    let mut comments_by_incident: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for c in comments {
        comments_by_incident.entry(c.incident_id).or_default().push(c);
    }

    incidents
        .into_iter()
        .map(|incident| {
            let reporter = users_by_id
                .get(&incident.reporter_id)
                .map(|u| PublicUser::from((*u).clone()));
            let assignee = incident
                .assigned_to
                .and_then(|id| users_by_id.get(&id))
                .map(|u| PublicUser::from((*u).clone()));
            let facility = facilities_by_id
                .get(&incident.facility_id)
                .map(|f| (*f).clone());

            let incident_attachments = attachments_by_incident
                .remove(&incident.id)
                .unwrap_or_default();

            let mut incident_comments = comments_by_incident
                .remove(&incident.id)
                .unwrap_or_default();
            incident_comments.sort_by_key(|c| c.created_at);

            let comments = incident_comments
                .into_iter()
                .map(|comment| {
                    let author = users_by_id.get(&comment.author_id).map(|u| CommentAuthor {
                        id: u.id,
                        name: u.name.clone(),
                        role: u.role.clone(),
                    });
                    CommentView { comment, author }
                })
                .collect();

            IncidentView {
                incident,
                reporter,
                assignee,
                facility,
                attachments: incident_attachments,
                comments,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(name: &str, role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{name}@example.com"),
            password_hash: "hash".into(),
            role: role.into(),
            facility_id: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn facility(name: &str) -> Facility {
        Facility {
            id: Uuid::new_v4(),
            name: name.into(),
            location: "Campus A".into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn incident(reporter: &User, fac: &Facility, assignee: Option<&User>) -> Incident {
        let now = Utc::now();
        Incident {
            id: Uuid::new_v4(),
            facility_id: fac.id,
            reporter_id: reporter.id,
            title: "Leaking pipe".into(),
            description: "Hallway B".into(),
            proposed_fix: None,
            priority: "high".into(),
            status: "open".into(),
            assigned_to: assignee.map(|a| a.id),
            created_at: now,
            updated_at: now,
        }
    }

    fn comment(incident: &Incident, author: &User, message: &str, offset_secs: i64) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            incident_id: incident.id,
            author_id: author.id,
            message: message.into(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn enriches_reporter_assignee_and_facility() {
        let reporter = user("reporter", "reporter");
        let admin = user("admin", "admin");
        let fac = facility("Main building");
        let inc = incident(&reporter, &fac, Some(&admin));

        let views = assemble(
            vec![inc],
            &[reporter.clone(), admin.clone()],
            &[fac.clone()],
            vec![],
            vec![],
        );

        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert_eq!(view.reporter.as_ref().unwrap().id, reporter.id);
        assert_eq!(view.assignee.as_ref().unwrap().id, admin.id);
        assert_eq!(view.facility.as_ref().unwrap().id, fac.id);
    }

    #[test]
    fn unresolved_references_become_none() {
        let reporter = user("reporter", "reporter");
        let fac = facility("Main building");
        let inc = incident(&reporter, &fac, None);

        // join tables are empty: nothing resolves
        let views = assemble(vec![inc], &[], &[], vec![], vec![]);
        let view = &views[0];
        assert!(view.reporter.is_none());
        assert!(view.assignee.is_none());
        assert!(view.facility.is_none());
    }

    #[test]
    fn comments_are_sorted_oldest_first_with_authors() {
        let reporter = user("reporter", "reporter");
        let admin = user("admin", "admin");
        let fac = facility("Main building");
        let inc = incident(&reporter, &fac, Some(&admin));

        let later = comment(&inc, &admin, "second", 10);
        let earlier = comment(&inc, &reporter, "first", -10);

        let views = assemble(
            vec![inc],
            &[reporter.clone(), admin.clone()],
            &[fac],
            vec![],
            vec![later, earlier],
        );

        let comments = &views[0].comments;
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comment.message, "first");
        assert_eq!(comments[1].comment.message, "second");
        assert_eq!(comments[0].author.as_ref().unwrap().role, "reporter");
        assert_eq!(comments[1].author.as_ref().unwrap().name, "admin");
    }

    #[test]
    fn attachments_are_grouped_by_incident() {
        let reporter = user("reporter", "reporter");
        let fac = facility("Main building");
        let first = incident(&reporter, &fac, None);
        let second = incident(&reporter, &fac, None);

        let att = Attachment {
            id: Uuid::new_v4(),
            incident_id: second.id,
            kind: "image".into(),
            url: "http://store/incident.png".into(),
            filename: "incident.png".into(),
            mime: "image/png".into(),
            size_bytes: 1024,
            created_at: Utc::now(),
        };

        let views = assemble(
            vec![first, second],
            &[reporter],
            &[fac],
            vec![att],
            vec![],
        );

        assert!(views[0].attachments.is_empty());
        assert_eq!(views[1].attachments.len(), 1);
        assert_eq!(views[1].attachments[0].filename, "incident.png");
    }

    #[test]
    fn incident_order_is_preserved() {
        let reporter = user("reporter", "reporter");
        let fac = facility("Main building");
        let newest = incident(&reporter, &fac, None);
        let oldest = incident(&reporter, &fac, None);
        let ids = vec![newest.id, oldest.id];

        let views = assemble(vec![newest, oldest], &[reporter], &[fac], vec![], vec![]);
        let out_ids: Vec<Uuid> = views.iter().map(|v| v.incident.id).collect();
        assert_eq!(out_ids, ids);
    }
}

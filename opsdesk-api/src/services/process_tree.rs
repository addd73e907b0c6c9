use serde::Serialize;

use crate::models::{Process, ProcessStep, SubStep, SubStepActor, SubStepForm};

pub const ACTOR_PERFORMER: &str = "performer";
pub const ACTOR_COORDINATOR: &str = "coordinator";

/// Full four-level process tree as served by `GET /processes/{id}`.
#[derive(Debug, Serialize)]
pub struct ProcessDetail {
    #[serde(flatten)]
    pub process: Process,
    pub steps: Vec<StepView>,
}

#[derive(Debug, Serialize)]
pub struct StepView {
    #[serde(flatten)]
    pub step: ProcessStep,
    pub sub_steps: Vec<SubStepView>,
}

#[derive(Debug, Serialize)]
pub struct SubStepView {
    #[serde(flatten)]
    pub sub_step: SubStep,
    pub performers: Vec<SubStepActor>,
    pub coordinators: Vec<SubStepActor>,
    pub forms: Vec<SubStepForm>,
}

/// Stitch the separately fetched levels together by foreign key.
///
/// Steps keep their `step_no` query order; sub-steps are re-sorted by
/// `sub_no` within each step; actors are partitioned into performer and
/// coordinator buckets by the tag field.
pub fn assemble(
    process: Process,
    steps: Vec<ProcessStep>,
    sub_steps: Vec<SubStep>,
    actors: Vec<SubStepActor>,
    forms: Vec<SubStepForm>,
) -> ProcessDetail {
    let steps = steps
        .into_iter()
        .map(|step| {
            let mut subs: Vec<SubStep> = sub_steps
                .iter()
                .filter(|ss| ss.step_id == step.id)
                .cloned()
                .collect();
            subs.sort_by_key(|ss| ss.sub_no);

            let sub_views = subs
                .into_iter()
                .map(|sub_step| {
                    let performers = actors
                        .iter()
                        .filter(|a| a.sub_step_id == sub_step.id && a.actor_type == ACTOR_PERFORMER)
                        .cloned()
                        .collect();
                    let coordinators = actors
                        .iter()
                        .filter(|a| {
                            a.sub_step_id == sub_step.id && a.actor_type == ACTOR_COORDINATOR
                        })
                        .cloned()
                        .collect();
                    let sub_forms = forms
                        .iter()
                        .filter(|f| f.sub_step_id == sub_step.id)
                        .cloned()
                        .collect();

                    SubStepView {
                        sub_step,
                        performers,
                        coordinators,
                        forms: sub_forms,
                    }
                })
                .collect();

            StepView {
                step,
                sub_steps: sub_views,
            }
        })
        .collect();

    ProcessDetail { process, steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn process() -> Process {
        Process {
            id: Uuid::new_v4(),
            code: "QT_TLTS".into(),
            name: "Thanh lý tài sản".into(),
            description: Some("Quy trình thanh lý tài sản".into()),
            version: "1.0".into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn step(process: &Process, no: i32, name: &str) -> ProcessStep {
        ProcessStep {
            id: Uuid::new_v4(),
            process_id: process.id,
            step_no: no,
            step_name: name.into(),
            note: None,
            created_at: Utc::now(),
        }
    }

    fn sub_step(step: &ProcessStep, no: i32, content: &str) -> SubStep {
        SubStep {
            id: Uuid::new_v4(),
            step_id: step.id,
            sub_no: no,
            work_content: content.into(),
            expected_result: None,
            due_days: None,
            created_at: Utc::now(),
        }
    }

    fn actor(sub: &SubStep, kind: &str, text: &str) -> SubStepActor {
        SubStepActor {
            id: Uuid::new_v4(),
            sub_step_id: sub.id,
            actor_type: kind.into(),
            actor_text: text.into(),
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn partitions_actors_by_tag() {
        let proc = process();
        let st = step(&proc, 1, "Lập giấy đề nghị");
        let ss = sub_step(&st, 1, "Lập giấy đề nghị thanh lý");
        let performer = actor(&ss, ACTOR_PERFORMER, "Trưởng đơn vị");
        let coordinator = actor(&ss, ACTOR_COORDINATOR, "P.TCHC-QT");

        let detail = assemble(
            proc,
            vec![st],
            vec![ss],
            vec![performer, coordinator],
            vec![],
        );

        let sub = &detail.steps[0].sub_steps[0];
        assert_eq!(sub.performers.len(), 1);
        assert_eq!(sub.performers[0].actor_text, "Trưởng đơn vị");
        assert_eq!(sub.coordinators.len(), 1);
        assert_eq!(sub.coordinators[0].actor_text, "P.TCHC-QT");
    }

    #[test]
    fn sub_steps_are_ordered_and_scoped_to_their_step() {
        let proc = process();
        let first = step(&proc, 1, "B1");
        let second = step(&proc, 2, "B2");
        let ss_b = sub_step(&first, 2, "later");
        let ss_a = sub_step(&first, 1, "earlier");
        let ss_other = sub_step(&second, 1, "other step");

        let detail = assemble(
            proc,
            vec![first, second],
            vec![ss_b, ss_a, ss_other],
            vec![],
            vec![],
        );

        let subs: Vec<&str> = detail.steps[0]
            .sub_steps
            .iter()
            .map(|s| s.sub_step.work_content.as_str())
            .collect();
        assert_eq!(subs, vec!["earlier", "later"]);
        assert_eq!(detail.steps[1].sub_steps.len(), 1);
    }

    #[test]
    fn forms_attach_to_their_sub_step() {
        let proc = process();
        let st = step(&proc, 1, "B1");
        let ss = sub_step(&st, 1, "Lập giấy đề nghị");
        let form = SubStepForm {
            id: Uuid::new_v4(),
            sub_step_id: ss.id,
            form_code: Some("M.01/QT_TLTS".into()),
            form_name: "Giấy đề nghị thanh lý tài sản".into(),
            url_file: Some("https://files.example.com/giay-de-nghi.docx".into()),
            note: None,
            created_at: Utc::now(),
        };

        let detail = assemble(proc, vec![st], vec![ss], vec![], vec![form]);
        let forms = &detail.steps[0].sub_steps[0].forms;
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].form_code.as_deref(), Some("M.01/QT_TLTS"));
    }
}

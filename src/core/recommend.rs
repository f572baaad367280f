use crate::core::student::StudentService;
use crate::domain::model::Student;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Counts how many current classes each peer shares with one student.
#[derive(Debug, Default)]
pub struct CoEnrollment {
    subject_id: String,
    counts: HashMap<String, usize>,
    peers: HashMap<String, Student>,
}

impl CoEnrollment {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            ..Self::default()
        }
    }

    /// Records one shared class with `peer`. The subject itself is ignored.
    pub fn record(&mut self, peer: Student) {
        if peer.id == self.subject_id {
            return;
        }
        *self.counts.entry(peer.id.clone()).or_insert(0) += 1;
        self.peers.insert(peer.id.clone(), peer);
    }

    pub fn count(&self, peer_id: &str) -> usize {
        self.counts.get(peer_id).copied().unwrap_or(0)
    }

    /// Peers by shared-class count, highest first; ties by id ascending.
    pub fn into_ranked(mut self) -> Vec<Student> {
        let mut ranked: Vec<(String, usize)> = self.counts.into_iter().collect();
        ranked.sort_by(|(a_id, a_count), (b_id, b_count)| {
            b_count.cmp(a_count).then_with(|| a_id.cmp(b_id))
        });

        ranked
            .into_iter()
            .filter_map(|(id, _)| self.peers.remove(&id))
            .collect()
    }
}

impl StudentService {
    /// Students sharing current classes with `id`, most shared classes first.
    ///
    /// Any failed lookup aborts the whole ranking.
    pub async fn recommended_teammates(&self, id: &str) -> Result<Vec<Student>> {
        self.with_deadline("recommended_teammates", async {
            let student = self.load_existing(id).await?;

            let mut tally = CoEnrollment::new(&student.id);
            for class_code in &student.current_classes {
                let classmates = self.students.search_current_class(class_code).await?;
                tracing::debug!("{} has {} enrolled students", class_code, classmates.len());
                for peer in classmates {
                    tally.record(peer);
                }
            }

            Ok(tally.into_ranked())
        })
        .await
    }
}

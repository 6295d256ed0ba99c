//! Action and workflow manifest documents.
//!
//! Manifests are kept as loosely-typed YAML so that unexpected shapes
//! degrade to "no steps" instead of a parse failure. Two step containers
//! are recognised:
//!
//! - `jobs.<id>.steps[]` (workflow documents)
//! - `runs.steps[]` (composite actions)

use serde_yaml::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Job,
    Composite,
}

/// A step that declares `uses`, along with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRef<'a> {
    pub kind: ContainerKind,
    /// Job id for [`ContainerKind::Job`], `"runs"` for composite steps.
    pub container: &'a str,
    pub index: usize,
    pub uses: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    document: Value,
}

impl Manifest {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        let document = serde_yaml::from_str(text)?;
        Ok(Self { document })
    }

    /// Manifest `name`, if declared.
    pub fn name(&self) -> Option<&str> {
        self.document.get("name").and_then(Value::as_str)
    }

    /// Every step with a `uses` declaration, job steps first, then composite steps.
    pub fn steps(&self) -> impl Iterator<Item = StepRef<'_>> {
        self.job_steps().chain(self.composite_steps())
    }

    pub fn uses(&self) -> impl Iterator<Item = &str> {
        self.steps().map(|step| step.uses)
    }

    fn jobs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.document
            .get("jobs")
            .and_then(Value::as_mapping)
            .into_iter()
            .flat_map(|jobs| jobs.iter())
            .filter_map(|(id, job)| id.as_str().map(|id| (id, job)))
    }

    fn job_steps(&self) -> impl Iterator<Item = StepRef<'_>> {
        self.jobs().flat_map(|(id, job)| {
            uses_in_sequence(job.get("steps"))
                .map(move |(index, uses)| StepRef {
                    kind: ContainerKind::Job,
                    container: id,
                    index,
                    uses,
                })
        })
    }

    fn composite_steps(&self) -> impl Iterator<Item = StepRef<'_>> {
        let steps = self.document.get("runs").and_then(|runs| runs.get("steps"));
        uses_in_sequence(steps).map(|(index, uses)| StepRef {
            kind: ContainerKind::Composite,
            container: "runs",
            index,
            uses,
        })
    }
}

fn uses_in_sequence(steps: Option<&Value>) -> impl Iterator<Item = (usize, &str)> {
    steps
        .and_then(Value::as_sequence)
        .into_iter()
        .flat_map(|steps| steps.iter().enumerate())
        .filter_map(|(index, step)| {
            step.get("uses")
                .and_then(Value::as_str)
                .map(|uses| (index, uses))
        })
}

pub mod answers;
pub mod attempt;
pub mod category;
pub mod loaders;
pub mod plan;
pub mod results;
pub mod section;

pub use answers::{AnswerPayload, AnswerSheet};
pub use attempt::{ExamAttempt, StartAttemptPayload};
pub use category::Category;
pub use loaders::load_answer_plan;
pub use plan::{AnswerPlan, SectionPlan, SubmitMode};
pub use results::{ExamResults, QuestionResult, SectionResult};
pub use section::{NextSectionPayload, Question, QuestionOption, QuestionType, Section};

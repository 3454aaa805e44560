use crate::errors::NOT_VERIFIED_MESSAGE;
use crate::models::organization::OrganizationStatus;

pub const STATUS_EMAIL_SUBJECT: &str = "Job Nest Organization Approval Status";

const REJECTED_MESSAGE: &str = "We're sorry to inform you that your organization registration has been rejected by our admin. If you're sure that the information you provided is correct, please reach out to the Job Nest admin or contact the Job Nest help center.";
const ACCEPTED_MESSAGE: &str = "Yay! Your organization registration status has been accepted by our admin. Post a job then select the best candidate to build a strong team at your organization :)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEmail {
    pub subject: String,
    pub html: String,
}

/// Renders the approval-status email for an organization's current status.
pub fn compose_status_email(status: OrganizationStatus) -> StatusEmail {
    let message = match status {
        OrganizationStatus::Rejected => REJECTED_MESSAGE,
        OrganizationStatus::Accepted => ACCEPTED_MESSAGE,
        OrganizationStatus::OnReview => NOT_VERIFIED_MESSAGE,
    };

    let html = format!(
        r#"<div style="border: 5px solid #ccc; padding: 15px;">
  <h1 style="text-align: center;">{STATUS_EMAIL_SUBJECT}</h1>
  <p>{message}</p>
  <div style="margin-top: 20px;">
    <p>Thank you for using <strong>Job Nest</strong> as your job portal app.</p>
    <p>Warm Regards,</p>
    <p>- Job Nest Team -</p>
  </div>
</div>"#
    );

    StatusEmail {
        subject: STATUS_EMAIL_SUBJECT.to_string(),
        html,
    }
}

pub const CRISIS_REPLY: &str = "I'm really glad you told me, and I'm taking what you said seriously. You deserve real, human support right now. \
Please reach out to someone who can be with you in this: in the US, call or text 988 to reach the Suicide & Crisis Lifeline, \
or text HOME to 741741 for the Crisis Text Line. If you're outside the US, please contact your local emergency number or a local crisis line. \
If you are in immediate danger, call 911 or your local emergency number now. \
While you reach out, press your feet into the floor, breathe in for 4, hold for 4, and breathe out slowly for 6. You are not alone in this.";

pub const PROVIDER_FAILURE_REPLY: &str = "I'm sorry, I lost my connection for a moment. \
Take one slow breath with me, in through your nose and out through your mouth, and then send that to me again.";

pub const EMPTY_COMPLETION_REPLY: &str = "I'm here with you. Take a slow breath, feel your feet on the ground, \
and tell me a little more about what's happening for you right now.";

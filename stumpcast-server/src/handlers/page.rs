use axum::response::Html;

/// Embedded single-page commentary client.
pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Stumpcast</title>
  <link href="https://maxcdn.bootstrapcdn.com/bootstrap/4.5.2/css/bootstrap.min.css" rel="stylesheet">
  <link href="https://fonts.googleapis.com/css2?family=Roboto:wght@400;700&display=swap" rel="stylesheet">
  <style>
    body {
      font-family: 'Roboto', sans-serif;
    }
    .container {
      margin-top: 20px;
    }
    #commentsDiv {
      margin-top: 20px;
      border: 1px solid #ddd;
      padding: 10px;
      height: 300px;
      overflow-y: auto;
    }
    textarea {
      width: 100%;
    }
  </style>
</head>
<body>
  <div class="container">
    <h1 class="text-center">Stumpcast</h1>
    <div class="form-group">
      <textarea id="commentaryInput" class="form-control" rows="4" placeholder="Enter commentary here..."></textarea>
    </div>
    <div class="form-group">
      <input id="scoreInput" class="form-control" type="number" placeholder="Enter runs scored..." min="0" max="6">
    </div>
    <div class="form-group">
      <input id="wicketInput" class="form-control" type="number" placeholder="Enter wickets lost..." min="0" max="10">
    </div>
    <button class="btn btn-primary" onclick="sendComment()">Send Comment</button>
    <div id="commentsDiv"></div>
  </div>

  <script>
    const scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
    const ws = new WebSocket(scheme + location.host + '/ws');

    // Send comment to server
    function sendComment() {
      const commentaryInput = document.getElementById('commentaryInput').value;
      const scoreInput = document.getElementById('scoreInput').value;
      const wicketInput = document.getElementById('wicketInput').value;

      if (commentaryInput.trim()) {
        const message = {
          commentary: commentaryInput,
          runs: scoreInput || 0,
          wickets: wicketInput || 0
        };
        ws.send(JSON.stringify(message));
        document.getElementById('commentaryInput').value = '';
        document.getElementById('scoreInput').value = '';
        document.getElementById('wicketInput').value = '';
      }
    }

    // Receive comments and display them, newest first
    ws.onmessage = function(event) {
      const commentsDiv = document.getElementById('commentsDiv');
      const newComment = document.createElement('div');
      newComment.innerHTML = event.data;
      commentsDiv.insertBefore(newComment, commentsDiv.firstChild);
    };

    // Request initial comments
    ws.onopen = function() {
      ws.send('GET_INITIAL_COMMENTS');
    };
  </script>
</body>
</html>
"#;
